use std::fmt;

/// Planning failures.  Input integrity problems found while loading are `instances::Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
  /// Item count is not a multiple of the cart capacity
  IndivisibleBatch { items: usize, capacity: usize },
  EmptyRoster,
  /// The solver proved no assignment satisfies the constraints
  Infeasible,
  SolverFailure(String),
  /// A selected group has no ordering whose cost matches the recorded figure
  NoMatchingPath { group: (String, String), cost: f64 },
  MalformedSelection(String),
  /// Audited plan objective disagrees with the model's prediction
  ObjectiveMismatch { predicted: f64, audited: f64 },
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::IndivisibleBatch { items, capacity } =>
        write!(f, "{} WIP items cannot be split into groups of {}", items, capacity),
      Error::EmptyRoster => write!(f, "cart roster is empty"),
      Error::Infeasible => write!(f, "assignment model is infeasible"),
      Error::SolverFailure(msg) => write!(f, "solver failed: {}", msg),
      Error::NoMatchingPath { group, cost } =>
        write!(f, "no path for group ({}, {}) matches cost {}", group.0, group.1, cost),
      Error::MalformedSelection(msg) => write!(f, "malformed selection: {}", msg),
      Error::ObjectiveMismatch { predicted, audited } =>
        write!(f, "plan objective {} does not match model objective {}", audited, predicted),
    }
  }
}

impl std::error::Error for Error {}
