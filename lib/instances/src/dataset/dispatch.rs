use super::*;
use crate::parsers::{ParseInstance, CsvFile};
use crate::raw::FromRaw;
use crate::raw::dispatch::{RawBatch, TravelTimeRow, CartRow, WipRow};
use crate::Map;

use itertools::Itertools;
use ndarray::Array2;

pub type Time = f64;
pub type Loc = u16;
/// Index of a WIP item within its batch
pub type Req = u16;
/// Index of a cart within the roster
pub type Cart = u16;


/// Dense travel-time matrix over interned locations.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimes {
  matrix: Array2<Time>,
}

impl TravelTimes {
  #[inline]
  pub fn get(&self, i: Loc, j: Loc) -> Time {
    self.matrix[(i as usize, j as usize)]
  }

  pub fn num_locs(&self) -> usize {
    self.matrix.nrows()
  }
}


#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchInstance {
  pub id: String,
  pub loc_names: Vec<String>,
  pub travel_time: TravelTimes,
  /// WIP items, in batch order
  pub W: Vec<Req>,
  pub wip_ids: Vec<String>,
  pub wip_from: Vec<Loc>,
  pub wip_to: Vec<Loc>,
  pub wip_qtime: Vec<Time>,
  /// Carts, in roster order
  pub C: Vec<Cart>,
  pub cart_ids: Vec<String>,
  pub cart_loc: Vec<Loc>,
}

/// Orders `LOC2` before `LOC10`; names without a numeric suffix sort lexically after those with one.
fn location_sort_key(name: &str) -> (Option<u64>, &str) {
  let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
  (name[name.len() - digits..].parse().ok(), name)
}

fn build_travel_times(rows: &[TravelTimeRow]) -> Result<(Vec<String>, Map<String, Loc>, TravelTimes)> {
  let loc_names: Vec<String> = rows.iter()
    .flat_map(|r| vec![r.from.as_str(), r.to.as_str()])
    .unique()
    .sorted_by(|a, b| {
      let (ka, kb) = (location_sort_key(a), location_sort_key(b));
      // None sorts before Some, flip so named-by-number locations come first
      (ka.0.is_none(), ka).cmp(&(kb.0.is_none(), kb))
    })
    .map(|s| s.to_string())
    .collect();

  if loc_names.len() > Loc::MAX as usize {
    anyhow::bail!("too many locations: {}", loc_names.len());
  }

  let loc_index: Map<String, Loc> = loc_names.iter()
    .enumerate()
    .map(|(k, name)| (name.clone(), k as Loc))
    .collect();

  let n = loc_names.len();
  let mut matrix = Array2::from_elem((n, n), Time::NAN);
  for k in 0..n {
    matrix[(k, k)] = 0.0;
  }
  for r in rows {
    if !r.time.is_finite() || r.time < 0.0 {
      return Err(Error::InvalidTravelTime(r.from.clone(), r.to.clone(), r.time).into());
    }
    matrix[(loc_index[&r.from] as usize, loc_index[&r.to] as usize)] = r.time;
  }

  for ((i, j), t) in matrix.indexed_iter() {
    if t.is_nan() {
      return Err(Error::MissingTravelTime(loc_names[i].clone(), loc_names[j].clone()).into());
    }
  }

  Ok((loc_names, loc_index, TravelTimes { matrix }))
}

const QTIME_COLUMN: &str = "Remaining Q-Time";

fn lookup_loc(loc_index: &Map<String, Loc>, name: &str) -> Result<Loc> {
  loc_index.get(name).copied().ok_or_else(|| Error::UnknownLocation(name.to_string()).into())
}

impl FromRaw<RawBatch> for DispatchInstance {
  fn from_raw(raw: RawBatch, id: Cow<str>) -> Result<DispatchInstance> {
    let (loc_names, loc_index, travel_time) = build_travel_times(&raw.travel_times)?;

    if raw.wips.len() > Req::MAX as usize {
      anyhow::bail!("too many WIP items: {}", raw.wips.len());
    }
    if raw.carts.len() > Cart::MAX as usize {
      anyhow::bail!("too many carts: {}", raw.carts.len());
    }

    if let Some(dup) = raw.wips.iter().map(|w| &w.id).duplicates().next() {
      return Err(Error::DuplicateId(dup.clone()).into());
    }
    if let Some(dup) = raw.carts.iter().map(|c| &c.id).duplicates().next() {
      return Err(Error::DuplicateId(dup.clone()).into());
    }

    let mut wip_ids = Vec::with_capacity(raw.wips.len());
    let mut wip_from = Vec::with_capacity(raw.wips.len());
    let mut wip_to = Vec::with_capacity(raw.wips.len());
    let mut wip_qtime = Vec::with_capacity(raw.wips.len());
    for WipRow { id, from, to, qtime } in raw.wips {
      if !qtime.is_finite() {
        return Err(Error::BadNumber(QTIME_COLUMN.to_string(), qtime.to_string()).into());
      }
      wip_from.push(lookup_loc(&loc_index, &from)?);
      wip_to.push(lookup_loc(&loc_index, &to)?);
      wip_qtime.push(qtime);
      wip_ids.push(id);
    }

    let mut cart_ids = Vec::with_capacity(raw.carts.len());
    let mut cart_loc = Vec::with_capacity(raw.carts.len());
    for CartRow { id, init_loc } in raw.carts {
      cart_loc.push(lookup_loc(&loc_index, &init_loc)?);
      cart_ids.push(id);
    }

    Ok(DispatchInstance {
      id: id.into_owned(),
      loc_names,
      travel_time,
      W: (0..wip_ids.len() as Req).collect(),
      wip_ids,
      wip_from,
      wip_to,
      wip_qtime,
      C: (0..cart_ids.len() as Cart).collect(),
      cart_ids,
      cart_loc,
    })
  }
}

impl DispatchInstance {
  /// Load a single planning run from the three CSV tables.
  pub fn load(time_matrix: impl AsRef<Path>, carts: impl AsRef<Path>, wips: impl AsRef<Path>) -> Result<Self> {
    let wips = wips.as_ref();
    let raw = RawBatch {
      travel_times: ParseInstance::parse(CsvFile(time_matrix.as_ref()))?,
      carts: ParseInstance::parse(CsvFile(carts.as_ref()))?,
      wips: ParseInstance::parse(CsvFile(wips))?,
    };
    let id = wips.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    DispatchInstance::from_raw(raw, id).context(format!("failed to load {:?}", wips))
  }
}


pub enum WipBatch {}

/// A folder of WIP batch files sharing one travel-time table and one cart roster.
pub struct WipBatches {
  layout: DynLayout<WipBatch>,
  travel_times: Vec<TravelTimeRow>,
  carts: Vec<CartRow>,
}

impl WipBatches {
  pub fn new(time_matrix: impl AsRef<Path>, carts: impl AsRef<Path>, wip_dir: impl AsRef<Path>) -> Result<Self> {
    Ok(WipBatches {
      layout: DynLayout::new(wip_dir, "*.csv")?,
      travel_times: ParseInstance::parse(CsvFile(time_matrix.as_ref()))?,
      carts: ParseInstance::parse(CsvFile(carts.as_ref()))?,
    })
  }
}

impl IdxNameMap for WipBatches {
  #[inline]
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    self.layout.index_to_name(idx)
  }

  #[inline]
  fn name_to_index(&self, name: &str) -> Result<usize> {
    self.layout.name_to_index(name)
  }

  #[inline]
  fn len(&self) -> usize { self.layout.len() }
}

impl Dataset for WipBatches {
  type Instance = DispatchInstance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    let name = self.index_to_name(idx)?;
    let path = self.layout.path(idx)?;
    let raw = RawBatch {
      travel_times: self.travel_times.clone(),
      carts: self.carts.clone(),
      wips: ParseInstance::parse(CsvFile(path))?,
    };
    DispatchInstance::from_raw(raw, name).context(format!("failed to load {:?}", path))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsers::CsvText;

  const TIMES: &str = "FROM,TO,XFER_TIME\nLOC10,LOC2,4\nLOC2,LOC10,5\n";
  const CARTS: &str = "CART_ID,INIT_LOC\nC1,LOC2\n";

  fn batch(times: &str, carts: &str, wips: &str) -> Result<DispatchInstance> {
    let raw = RawBatch {
      travel_times: ParseInstance::parse(CsvText(times))?,
      carts: ParseInstance::parse(CsvText(carts))?,
      wips: ParseInstance::parse(CsvText(wips))?,
    };
    DispatchInstance::from_raw(raw, "test".into())
  }

  fn error_of(r: Result<DispatchInstance>) -> Error {
    r.unwrap_err().downcast_ref::<Error>().cloned().expect("instance error")
  }

  #[test]
  fn locations_sorted_by_number() -> Result<()> {
    let data = batch(TIMES, CARTS, "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC10,LOC2,7\n")?;
    assert_eq!(data.loc_names, vec!["LOC2".to_string(), "LOC10".to_string()]);
    assert_eq!(data.travel_time.get(1, 0), 4.0);
    assert_eq!(data.travel_time.get(0, 1), 5.0);
    assert_eq!(data.travel_time.get(1, 1), 0.0);
    assert_eq!((data.wip_from[0], data.wip_to[0]), (1, 0));
    assert_eq!(data.cart_loc, vec![0]);
    Ok(())
  }

  #[test]
  fn missing_pair() {
    let times = "FROM,TO,XFER_TIME\nA,B,1\nB,C,1\nC,A,1\nB,A,1\nC,B,1\n";
    let e = error_of(batch(times, "CART_ID,INIT_LOC\n", "WIP_ID,FROM,TO,Remaining Q-Time\n"));
    assert_eq!(e, Error::MissingTravelTime("A".into(), "C".into()));
  }

  #[test]
  fn unknown_location() {
    let e = error_of(batch(TIMES, CARTS, "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC3,LOC2,7\n"));
    assert_eq!(e, Error::UnknownLocation("LOC3".into()));
  }

  #[test]
  fn negative_time() {
    let e = error_of(batch("FROM,TO,XFER_TIME\nA,B,-1\nB,A,1\n", "CART_ID,INIT_LOC\n", "WIP_ID,FROM,TO,Remaining Q-Time\n"));
    assert_eq!(e, Error::InvalidTravelTime("A".into(), "B".into(), -1.0));
  }

  #[test]
  fn non_finite_deadline() {
    let wips = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC2,LOC10,NaN\n";
    assert_eq!(error_of(batch(TIMES, CARTS, wips)), Error::BadNumber("Remaining Q-Time".into(), "NaN".into()));
    let wips = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC2,LOC10,-inf\n";
    assert_eq!(error_of(batch(TIMES, CARTS, wips)), Error::BadNumber("Remaining Q-Time".into(), "-inf".into()));
  }

  #[test]
  fn duplicate_wip() {
    let wips = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC2,LOC10,7\nW1,LOC10,LOC2,7\n";
    assert_eq!(error_of(batch(TIMES, CARTS, wips)), Error::DuplicateId("W1".into()));
  }

  #[test]
  fn batch_folder() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("instances-batches-{}", std::process::id()));
    let wip_dir = dir.join("wip_data");
    std::fs::create_dir_all(&wip_dir)?;
    std::fs::write(dir.join("time_matrix.csv"), TIMES)?;
    std::fs::write(dir.join("cart_data.csv"), CARTS)?;
    std::fs::write(wip_dir.join("wip_data_b.csv"), "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC2,LOC10,7\n")?;
    std::fs::write(wip_dir.join("wip_data_a.csv"), "WIP_ID,FROM,TO,Remaining Q-Time\nW9,LOC10,LOC2,3\n")?;

    let batches = WipBatches::new(dir.join("time_matrix.csv"), dir.join("cart_data.csv"), &wip_dir)?;
    assert_eq!(batches.len(), 2);
    let data = batches.load_instance(0)?;
    assert_eq!(data.id, "wip_data_a");
    assert_eq!(data.wip_ids, vec!["W9".to_string()]);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
  }
}
