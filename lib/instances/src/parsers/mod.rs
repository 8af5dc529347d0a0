mod table;
pub use table::{CsvFile, CsvText};

pub trait ParseInstance<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
