use std::fmt;
use std::io::Write;
use std::path::Path as FsPath;
use std::str::FromStr;
use anyhow::Context;
use instances::{ParseInstance, CsvFile};
use instances::raw::CsvRecord;
use instances::raw::dispatch::PlanRow as RawRow;
use tracing::*;

use crate::*;
use crate::data::wip::*;
use super::{Group, GroupInfo, GroupPrice, Assignment, Path};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Action {
  Pickup,
  Delivery,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Action::Pickup => "PICKUP",
      Action::Delivery => "DELIVERY",
    })
  }
}

impl FromStr for Action {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s {
      "PICKUP" => Ok(Action::Pickup),
      "DELIVERY" => Ok(Action::Delivery),
      _ => Err(format!("invalid action: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
  pub cart: String,
  /// 1-based position along the cart's route
  pub order: usize,
  pub wip: String,
  pub action: Action,
  pub complete_time: Time,
}

/// Ordered plan records, grouped by cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
  pub rows: Vec<PlanRow>,
}

impl PlanRow {
  fn to_raw(&self) -> RawRow {
    RawRow {
      cart: self.cart.clone(),
      order: self.order,
      wip: self.wip.clone(),
      action: self.action.to_string(),
      complete_time: self.complete_time,
    }
  }
}

impl RoutePlan {
  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn num_carts(&self) -> usize {
    self.rows.iter().map(|r| r.cart.as_str()).collect::<Set<_>>().len()
  }

  /// Write the plan as CSV.  The header is written even when the plan is empty.
  pub fn write_csv(&self, w: impl Write) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    writer.write_record(RawRow::COLUMNS)?;
    for r in &self.rows {
      writer.serialize(r.to_raw())?;
    }
    writer.flush()?;
    Ok(())
  }

  pub fn save(&self, path: impl AsRef<FsPath>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).context(format!("failed to create {:?}", path))?;
    self.write_csv(file).context(format!("failed to write {:?}", path))
  }

  pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
    let path = path.as_ref();
    let raw: Vec<RawRow> = ParseInstance::parse(CsvFile(path))?;
    let mut rows = Vec::with_capacity(raw.len());
    for r in raw {
      let action = r.action.parse::<Action>()
        .map_err(anyhow::Error::msg)
        .context(format!("failed to read {:?}", path))?;
      rows.push(PlanRow { cart: r.cart, order: r.order, wip: r.wip, action, complete_time: r.complete_time });
    }
    Ok(RoutePlan { rows })
  }
}


fn within(a: f64, b: f64, tol: f64) -> bool {
  (a - b).abs() <= tol
}

/// The ordering of `group` realising `price` for a cart leaving `start`.  Among matching orderings
/// the earliest first delivery wins, then enumeration order.
pub fn select_path<'g>(data: &DispatchInstance, group: &'g Group, start: Loc, price: &GroupPrice, cfg: &PlanConfig) -> Result<&'g Path> {
  let tol = cfg.cost_tolerance;
  let chosen = group.paths.iter()
    .filter(|p| within(p.total_cost(data, start), price.cost, tol))
    .filter(|p| cfg.penalty_policy == PenaltyPolicy::Independent || within(p.penalty(data, start), price.penalty, tol))
    .min_by(|a, b| a.arrival.first_time().total_cmp(&b.arrival.first_time()));

  match chosen {
    Some(p) => Ok(p),
    None => {
      let names = (data.wip_name(group.reqs.0).to_string(), data.wip_name(group.reqs.1).to_string());
      error!(group=?names, cost=price.cost, penalty=price.penalty, "no matching path");
      Err(Error::NoMatchingPath { group: names, cost: price.cost }.into())
    }
  }
}

/// Walk `path` from `start`, marking the first visit to an item as its pickup and the second as
/// its delivery.
pub fn route_rows(data: &DispatchInstance, cart: &str, start: Loc, path: &Path) -> Vec<PlanRow> {
  let mut touched: Vec<Req> = Vec::with_capacity(path.stops.len());
  let mut rows = Vec::with_capacity(path.stops.len());
  let mut loc = start;
  let mut t = 0.0;

  for (k, &r) in path.items().iter().enumerate() {
    let action = if touched.contains(&r) { Action::Delivery } else { Action::Pickup };
    touched.push(r);
    let next = match action {
      Action::Pickup => data.pickup_loc(r),
      Action::Delivery => data.delivery_loc(r),
    };
    t += data.tt(loc, next);
    loc = next;
    rows.push(PlanRow {
      cart: cart.to_string(),
      order: k + 1,
      wip: data.wip_name(r).to_string(),
      action,
      complete_time: t,
    });
  }
  rows
}

#[instrument(level="info", skip(groups, assignments, cfg), fields(instance=%groups.data.id))]
pub fn reconstruct(groups: &GroupInfo, assignments: &[Assignment], cfg: &PlanConfig) -> Result<RoutePlan> {
  let data = groups.data;
  let mut plan = RoutePlan::default();
  for a in assignments {
    let group = &groups.groups[a.group];
    let path = select_path(data, group, a.start, &a.price, cfg)?;
    debug!(
      cart=%a.cart,
      first=%data.wip_name(path.arrival.order[0]),
      first_at=path.lead_time(data, a.start) + path.arrival.first_time(),
      second=%data.wip_name(path.arrival.order[1]),
      second_at=path.total_cost(data, a.start),
      "route"
    );
    plan.rows.extend(route_rows(data, &a.cart, a.start, path));
  }
  info!(carts=assignments.len(), rows=plan.rows.len(), "plan built");
  Ok(plan)
}
