use std::io::Read;
use std::path::Path;
use anyhow::Context;
use csv::{DeserializeErrorKind, StringRecord};
use crate::{Result, Error};
use crate::raw::CsvRecord;
use super::ParseInstance;

/// CSV table stored on disk.
#[derive(Debug, Copy, Clone)]
pub struct CsvFile<P>(pub P);

/// CSV table already in memory.
#[derive(Debug, Copy, Clone)]
pub struct CsvText<'a>(pub &'a str);

impl<'a, R: CsvRecord> ParseInstance<CsvText<'a>> for Vec<R> {
  fn parse(input: CsvText<'a>) -> Result<Self> {
    read_records(input.0.as_bytes())
  }
}

impl<P: AsRef<Path>, R: CsvRecord> ParseInstance<CsvFile<P>> for Vec<R> {
  fn parse(input: CsvFile<P>) -> Result<Self> {
    let path = input.0.as_ref();
    let file = std::fs::File::open(path).context(format!("failed to open {:?}", path))?;
    read_records(file).context(format!("failed to parse {:?}", path))
  }
}

/// Number fields which fail to parse are reported by column name.
fn field_error(headers: &StringRecord, row: &StringRecord, err: csv::Error) -> anyhow::Error {
  if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
    if let (DeserializeErrorKind::ParseFloat(_), Some(k)) | (DeserializeErrorKind::ParseInt(_), Some(k)) = (de.kind(), de.field()) {
      let k = k as usize;
      let column = headers.get(k).unwrap_or("");
      let value = row.get(k).unwrap_or("");
      return Error::BadNumber(column.to_string(), value.to_string()).into();
    }
  }
  anyhow::Error::new(err)
}

fn read_records<R: CsvRecord>(input: impl Read) -> Result<Vec<R>> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_reader(input);

  let headers = reader.headers()?.clone();
  for &name in R::COLUMNS {
    if !headers.iter().any(|h| h == name) {
      return Err(Error::MissingColumn(name.to_string()).into());
    }
  }

  let mut records = Vec::new();
  let mut row = StringRecord::new();
  while reader.read_record(&mut row)? {
    let r = row.deserialize(Some(&headers)).map_err(|e| field_error(&headers, &row, e))?;
    records.push(r);
  }
  Ok(records)
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::raw::dispatch::*;

  #[test]
  fn wip_table() -> Result<()> {
    let text = "WIP_ID,FROM,TO,Remaining Q-Time\r\nW1,LOC1,LOC2,10\r\nW2,LOC2,LOC1,12.5\r\n\r\n";
    let wips: Vec<WipRow> = ParseInstance::parse(CsvText(text))?;
    assert_eq!(wips.len(), 2);
    assert_eq!(wips[1], WipRow { id: "W2".into(), from: "LOC2".into(), to: "LOC1".into(), qtime: 12.5 });
    Ok(())
  }

  #[test]
  fn columns_by_header_name() -> Result<()> {
    let text = "XFER_TIME,TO,FROM,NOTE\n3,B,A,x\n\"4\",A,\"B\",y";
    let rows: Vec<TravelTimeRow> = ParseInstance::parse(CsvText(text))?;
    assert_eq!(rows[0], TravelTimeRow { from: "A".into(), to: "B".into(), time: 3.0 });
    assert_eq!(rows[1], TravelTimeRow { from: "B".into(), to: "A".into(), time: 4.0 });
    Ok(())
  }

  #[test]
  fn quoted_ids() -> Result<()> {
    let text = "WIP_ID,FROM,TO,Remaining Q-Time\n\"W,1\",A,B,10\n\"W\"\"2\",B,A,3\n";
    let wips: Vec<WipRow> = ParseInstance::parse(CsvText(text))?;
    assert_eq!(wips[0].id, "W,1");
    assert_eq!(wips[1].id, "W\"2");
    assert_eq!(wips[1].qtime, 3.0);
    Ok(())
  }

  #[test]
  fn missing_column() {
    let text = "CART_ID,LOC\nC1,A\n";
    let err = <Vec<CartRow>>::parse(CsvText(text)).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::MissingColumn("INIT_LOC".into())));
  }

  #[test]
  fn bad_number() {
    let text = "FROM,TO,XFER_TIME\nA,B,soon\n";
    let err = <Vec<TravelTimeRow>>::parse(CsvText(text)).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::BadNumber("XFER_TIME".into(), "soon".into())));
  }

  #[test]
  fn fractional_order() {
    let text = "CART_ID,ORDER,WIP_ID,ACTION,COMPLETE_TIME\nC01,1.7,W1,PICKUP,0\n";
    let err = <Vec<PlanRow>>::parse(CsvText(text)).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::BadNumber("ORDER".into(), "1.7".into())));
    let text = "CART_ID,ORDER,WIP_ID,ACTION,COMPLETE_TIME\nC01,-3,W1,PICKUP,0\n";
    assert!(<Vec<PlanRow>>::parse(CsvText(text)).is_err());
  }

  #[test]
  fn short_row() {
    let text = "CART_ID,INIT_LOC\nC1\n";
    assert!(<Vec<CartRow>>::parse(CsvText(text)).is_err());
  }
}
