use std::str::FromStr;

/// Objective weights: `h` per unit of transport time, `m` per unit of lateness.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Weights {
  pub h: f64,
  pub m: f64,
}

impl Default for Weights {
  fn default() -> Self { Weights { h: 1.0, m: 100_000.0 } }
}

impl Weights {
  #[inline]
  pub fn combine(&self, cost: f64, penalty: f64) -> f64 {
    self.h * cost + self.m * penalty
  }
}

/// How a group's penalty figure relates to its cost figure.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PenaltyPolicy {
  /// Cost and the lateness of each delivery event are minimised separately over all orderings,
  /// so the figures may describe different routes.
  Independent,
  /// Both figures come from the single ordering minimising the weighted objective.
  Joint,
}

impl Default for PenaltyPolicy {
  fn default() -> Self { PenaltyPolicy::Independent }
}

impl FromStr for PenaltyPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    return match s {
      "independent" => Ok(Self::Independent),
      "joint" => Ok(Self::Joint),
      _ => Err(format!("invalid string: {}", s))
    };
  }
}

pub const PENALTY_POLICY_STRINGS: [&str; 2] = ["independent", "joint"];

/// Cart capacity.  Path enumeration is written for pairs.
pub const CART_CAPACITY: usize = 2;

/// Default tolerance when matching floating-point costs.
pub const COST_TOL: f64 = 1e-5;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlanConfig {
  pub weights: Weights,
  pub penalty_policy: PenaltyPolicy,
  pub cost_tolerance: f64,
}

impl Default for PlanConfig {
  fn default() -> Self {
    PlanConfig {
      weights: Weights::default(),
      penalty_policy: PenaltyPolicy::default(),
      cost_tolerance: COST_TOL,
    }
  }
}
