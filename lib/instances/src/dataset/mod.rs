use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::Error;
use std::borrow::Cow;


pub trait IdxNameMap {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>>;

  fn name_to_index(&self, name: &str) -> Result<usize>;

  fn len(&self) -> usize;

  fn check_idx(&self, idx: usize) -> Result<()> {
    if self.len() <= idx {
      Err(Error::IndexOutOfRange.into())
    } else {
      Ok(())
    }
  }
}


impl<'a, D: IdxNameMap> IdxNameMap for &'a D {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    D::index_to_name(self, idx)
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    D::name_to_index(self, name)
  }

  fn len(&self) -> usize {
    D::len(self)
  }
}

pub trait Dataset: IdxNameMap + Sync {
  type Instance;
  fn load_instance(&self, idx: usize) -> Result<Self::Instance>;
}


impl<'a, D: Dataset> Dataset for &'a D {
  type Instance = D::Instance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    D::load_instance(self, idx)
  }
}


/// A Dynamic Layout Dataset: every file in a directory matching a glob pattern is an instance.
/// Instances are ordered by path, and named by file stem.
pub struct DynLayout<D> {
  _marker: PhantomData<D>,
  name_order: Vec<PathBuf>,
  name_to_idx_map: HashMap<String, usize>,
}

impl<D> DynLayout<D> {
  pub fn new(dir: impl AsRef<Path>, patt: &str) -> Result<Self> {
    let dir = dir.as_ref();
    let ctx = format!("try read directory {:?}", dir);
    let dir = dir.canonicalize().context(ctx)?;

    let mut p = dir.to_string_lossy().into_owned();
    p.push('/');
    p.push_str(patt);

    let names : std::result::Result<Vec<PathBuf>, _> = glob::glob(&p)?.collect();
    let mut name_order = names?;
    name_order.sort();
    let name_to_idx_map: Result<HashMap<_, _>> = name_order.iter()
      .enumerate()
      .map(|(k, p)| {
        let n = p.file_stem().ok_or_else(|| anyhow::anyhow!("missing file stem: {:?}", p))?;
        Ok((n.to_string_lossy().into_owned(), k))
      })
      .collect();
    let name_to_idx_map = name_to_idx_map?;
    Ok(DynLayout {
      _marker: Default::default(),
      name_order,
      name_to_idx_map
    })
  }

  pub fn path(&self, idx: usize) -> Result<&Path> {
    self.name_order.get(idx)
      .map(|p| p.as_path())
      .ok_or_else(|| Error::IndexOutOfRange.into())
  }
}

impl<D> IdxNameMap for DynLayout<D> {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    self.check_idx(idx)?;
    let name = self.name_order[idx].file_stem()
      .ok_or_else(|| anyhow::anyhow!("missing file stem for idx {}", idx))?;
    Ok(name.to_string_lossy())
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    let idx = *self.name_to_idx_map.get(name).ok_or(Error::UnkownInstanceName)?;
    Ok(idx)
  }

  fn len(&self) -> usize { self.name_order.len() }
}


pub mod dispatch;


#[cfg(test)]
mod tests {
  use super::*;

  fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("instances-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn dyn_layout_order() -> Result<()> {
    let dir = scratch_dir("layout");
    for name in &["wip_data_3.csv", "wip_data_1.csv", "wip_data_2.csv", "notes.txt"] {
      std::fs::write(dir.join(name), "")?;
    }
    let layout: DynLayout<()> = DynLayout::new(&dir, "*.csv")?;
    assert_eq!(layout.len(), 3);
    assert_eq!(layout.index_to_name(0)?, "wip_data_1");
    assert_eq!(layout.name_to_index("wip_data_3")?, 2);
    assert!(layout.index_to_name(3).is_err());
    assert_eq!(
      layout.name_to_index("notes").unwrap_err().downcast_ref::<Error>(),
      Some(&Error::UnkownInstanceName)
    );
    std::fs::remove_dir_all(&dir)?;
    Ok(())
  }
}
