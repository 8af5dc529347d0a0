use std::path::Path;
use anyhow::Result;
use instances::dataset::dispatch::WipBatches;

pub mod wip;

pub fn load_instance(time_matrix: impl AsRef<Path>, carts: impl AsRef<Path>, wips: impl AsRef<Path>) -> Result<wip::DispatchInstance> {
  wip::DispatchInstance::load(time_matrix, carts, wips)
}

pub fn load_batches(time_matrix: impl AsRef<Path>, carts: impl AsRef<Path>, wip_dir: impl AsRef<Path>) -> Result<WipBatches> {
  WipBatches::new(time_matrix, carts, wip_dir)
}

/// Build an instance from in-memory CSV tables.
#[cfg(test)]
pub(crate) fn instance_from_csv(times: &str, carts: &str, wips: &str) -> Result<wip::DispatchInstance> {
  use instances::{ParseInstance, CsvText};
  use instances::raw::{FromRaw, dispatch::RawBatch};
  let raw = RawBatch {
    travel_times: ParseInstance::parse(CsvText(times))?,
    carts: ParseInstance::parse(CsvText(carts))?,
    wips: ParseInstance::parse(CsvText(wips))?,
  };
  wip::DispatchInstance::from_raw(raw, "test".into())
}

#[cfg(test)]
pub(crate) mod fixtures {
  /// Two locations five minutes apart, one cart at A.
  pub const AB_TIMES: &str = "FROM,TO,XFER_TIME\nA,A,0\nA,B,5\nB,A,5\nB,B,0\n";
  pub const AB_CARTS: &str = "CART_ID,INIT_LOC\nC1,A\nC2,A\n";
  pub const AB_WIPS: &str = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,A,B,10\nW2,B,A,10\n";

  /// Four locations on a line, unit spacing.
  pub fn line_times() -> String {
    let mut s = String::from("FROM,TO,XFER_TIME\n");
    for i in 1..=4i32 {
      for j in 1..=4i32 {
        s.push_str(&format!("LOC{},LOC{},{}\n", i, j, (i - j).abs()));
      }
    }
    s
  }
}
