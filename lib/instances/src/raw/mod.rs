use std::borrow::Cow;
use serde::de::DeserializeOwned;

pub mod dispatch;

pub trait FromRaw<T> where Self: Sized {
  fn from_raw(raw: T, id: Cow<str>) -> crate::Result<Self>;
}

/// A single typed row of a CSV table.  Columns are matched by header name, extra columns are
/// ignored and every name in `COLUMNS` must be present.
pub trait CsvRecord: DeserializeOwned {
  const COLUMNS: &'static [&'static str];
}
