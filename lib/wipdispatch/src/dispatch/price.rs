use tracing::*;

use crate::*;
use crate::config::CART_CAPACITY;
use crate::data::wip::*;
use super::{Group, Path};

/// Cost and penalty figures of a group for a cart leaving a given location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GroupPrice {
  /// Completion time of the last delivery
  pub cost: Time,
  /// Total lateness over the delivery events
  pub penalty: Time,
}

impl GroupPrice {
  #[inline]
  pub fn objective(&self, weights: &Weights) -> f64 {
    weights.combine(self.cost, self.penalty)
  }
}

/// Cost and per-event lateness are minimised separately over the group's orderings.
pub fn price_independent(data: &DispatchInstance, group: &Group, start: Loc) -> GroupPrice {
  let mut cost = Time::INFINITY;
  let mut late = [Time::INFINITY; CART_CAPACITY];

  for p in &group.paths {
    cost = cost.min(p.total_cost(data, start));
    for (k, l) in p.lateness(data, start).iter().enumerate() {
      late[k] = late[k].min(*l);
    }
  }

  let penalty = late.iter().map(|l| l.max(0.0)).sum();
  GroupPrice { cost, penalty }
}

/// The ordering with the lowest weighted objective.  Ties go to the earlier first delivery, then
/// to enumeration order.
pub fn best_path<'g>(data: &DispatchInstance, group: &'g Group, start: Loc, weights: &Weights) -> Option<&'g Path> {
  group.paths.iter()
    .map(|p| (weights.combine(p.total_cost(data, start), p.penalty(data, start)), p.arrival.first_time(), p))
    .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
    .map(|(_, _, p)| p)
}

/// Cost and penalty are both taken from the single best ordering.
pub fn price_joint(data: &DispatchInstance, group: &Group, start: Loc, weights: &Weights) -> GroupPrice {
  match best_path(data, group, start, weights) {
    Some(p) => GroupPrice { cost: p.total_cost(data, start), penalty: p.penalty(data, start) },
    None => GroupPrice { cost: Time::INFINITY, penalty: Time::INFINITY },
  }
}

pub fn price_group(data: &DispatchInstance, group: &Group, start: Loc, cfg: &PlanConfig) -> GroupPrice {
  let price = match cfg.penalty_policy {
    PenaltyPolicy::Independent => price_independent(data, group, start),
    PenaltyPolicy::Joint => price_joint(data, group, start, &cfg.weights),
  };
  trace!(reqs=?group.reqs, start, ?price);
  price
}
