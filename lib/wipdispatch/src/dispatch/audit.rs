use tracing::*;

use crate::*;
use crate::data::wip::*;
use super::{RoutePlan, Action};

/// Objective figures recomputed from a realised plan.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Objective {
  /// Total lateness, scaled by `m`
  pub total_penalty: f64,
  /// Sum over carts of the last completion time, scaled by `h`
  pub total_transport: f64,
  pub total_cost: f64,
}

impl Objective {
  pub fn to_json(&self) -> json::JsonValue {
    json::object! {
      total_penalty: self.total_penalty,
      total_transport: self.total_transport,
      total_cost: self.total_cost,
    }
  }
}

/// Recompute the objective of `plan` from the item deadlines.  Deliveries of items without a
/// known deadline are never late.
#[instrument(level="debug", skip(plan, deadlines))]
pub fn evaluate(plan: &RoutePlan, deadlines: &Map<String, Time>, weights: &Weights) -> Objective {
  let mut lateness = 0.0;
  let mut finish: Map<&str, Time> = Map::default();

  for r in &plan.rows {
    let t = finish.entry(r.cart.as_str()).or_insert(Time::NEG_INFINITY);
    *t = t.max(r.complete_time);

    if r.action == Action::Delivery {
      match deadlines.get(&r.wip) {
        Some(&due) => lateness += (r.complete_time - due).max(0.0),
        None => warn!(wip=%r.wip, "delivered item has no deadline"),
      }
    }
  }

  let total_penalty = lateness * weights.m;
  let total_transport = finish.values().sum::<Time>() * weights.h;
  let obj = Objective { total_penalty, total_transport, total_cost: total_penalty + total_transport };
  debug!(?obj);
  obj
}

pub fn deadlines(data: &DispatchInstance) -> Map<String, Time> {
  data.wip_ids.iter().cloned().zip(data.wip_qtime.iter().copied()).collect()
}

/// Audit a plan against the deadlines of the batch it was built for.
pub fn evaluate_instance(plan: &RoutePlan, data: &DispatchInstance, weights: &Weights) -> Objective {
  evaluate(plan, &deadlines(data), weights)
}
