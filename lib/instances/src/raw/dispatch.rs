use serde::{Deserialize, Serialize};
use super::CsvRecord;

pub type Time = f64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TravelTimeRow {
  #[serde(rename = "FROM")]
  pub from: String,
  #[serde(rename = "TO")]
  pub to: String,
  #[serde(rename = "XFER_TIME")]
  pub time: Time,
}

impl CsvRecord for TravelTimeRow {
  const COLUMNS: &'static [&'static str] = &["FROM", "TO", "XFER_TIME"];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartRow {
  #[serde(rename = "CART_ID")]
  pub id: String,
  #[serde(rename = "INIT_LOC")]
  pub init_loc: String,
}

impl CsvRecord for CartRow {
  const COLUMNS: &'static [&'static str] = &["CART_ID", "INIT_LOC"];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WipRow {
  #[serde(rename = "WIP_ID")]
  pub id: String,
  #[serde(rename = "FROM")]
  pub from: String,
  #[serde(rename = "TO")]
  pub to: String,
  #[serde(rename = "Remaining Q-Time")]
  pub qtime: Time,
}

impl CsvRecord for WipRow {
  const COLUMNS: &'static [&'static str] = &["WIP_ID", "FROM", "TO", "Remaining Q-Time"];
}

/// One line of a written route plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PlanRow {
  #[serde(rename = "CART_ID")]
  pub cart: String,
  /// 1-based position along the cart's route
  pub order: usize,
  #[serde(rename = "WIP_ID")]
  pub wip: String,
  pub action: String,
  #[serde(rename = "COMPLETE_TIME")]
  pub complete_time: Time,
}

impl CsvRecord for PlanRow {
  const COLUMNS: &'static [&'static str] = &["CART_ID", "ORDER", "WIP_ID", "ACTION", "COMPLETE_TIME"];
}

/// The three input tables of one planning run, as read from disk.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
  pub travel_times: Vec<TravelTimeRow>,
  pub carts: Vec<CartRow>,
  pub wips: Vec<WipRow>,
}
