//! A small solver-neutral integer program representation.  Formulations only describe the model;
//! the `Solver` implementations translate and solve it.
use std::fmt;
use tracing::*;

use crate::*;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Var(pub usize);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
  Binary,
  /// Continuous in `[0, 1]`
  Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
  pub name: String,
  pub domain: Domain,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sense {
  Eq,
  Le,
  Ge,
}

impl fmt::Display for Sense {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Sense::Eq => "==",
      Sense::Le => "<=",
      Sense::Ge => ">=",
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
  pub name: String,
  pub lhs: Vec<(Var, f64)>,
  pub sense: Sense,
  pub rhs: f64,
}

impl Constraint {
  pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
    let lhs: f64 = self.lhs.iter().map(|&(v, a)| a * values[v.0]).sum();
    match self.sense {
      Sense::Eq => (lhs - self.rhs).abs() <= tol,
      Sense::Le => lhs <= self.rhs + tol,
      Sense::Ge => lhs >= self.rhs - tol,
    }
  }
}

/// Minimisation model with a linear objective.
#[derive(Debug, Clone, Default)]
pub struct Model {
  pub name: String,
  pub vars: Vec<VarDef>,
  pub constraints: Vec<Constraint>,
  pub objective: Vec<(Var, f64)>,
}

impl Model {
  pub fn new(name: impl Into<String>) -> Self {
    Model { name: name.into(), ..Model::default() }
  }

  pub fn add_var(&mut self, name: impl Into<String>, domain: Domain) -> Var {
    self.vars.push(VarDef { name: name.into(), domain });
    Var(self.vars.len() - 1)
  }

  pub fn add_constr(&mut self, name: impl Into<String>, lhs: Vec<(Var, f64)>, sense: Sense, rhs: f64) {
    self.constraints.push(Constraint { name: name.into(), lhs, sense, rhs });
  }

  pub fn set_objective(&mut self, objective: Vec<(Var, f64)>) {
    self.objective = objective;
  }

  /// Objective value of an assignment of `values` to the variables.
  pub fn evaluate(&self, values: &[f64]) -> f64 {
    self.objective.iter().map(|&(v, c)| c * values[v.0]).sum()
  }

  pub fn var_name(&self, v: Var) -> &str {
    &self.vars[v.0].name
  }

  pub fn num_vars(&self) -> usize { self.vars.len() }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
  Optimal,
  Infeasible,
  Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
  pub status: SolveStatus,
  /// Indexed by `Var`, empty unless the status is `Optimal`
  pub values: Vec<f64>,
}

impl Solution {
  #[inline]
  pub fn value(&self, v: Var) -> f64 {
    self.values[v.0]
  }

  #[inline]
  pub fn is_selected(&self, v: Var) -> bool {
    self.values[v.0] > 0.5
  }

  pub fn objective(&self, model: &Model) -> f64 {
    model.evaluate(&self.values)
  }
}

pub trait Solver {
  fn solve(&self, model: &Model) -> Result<Solution>;
}

impl<S: Solver + ?Sized> Solver for &S {
  fn solve(&self, model: &Model) -> Result<Solution> {
    (**self).solve(model)
  }
}


/// Solves models with the pure-Rust MILP backend of `good_lp`.
#[derive(Debug, Copy, Clone, Default)]
pub struct GoodLp;

impl Solver for GoodLp {
  #[instrument(level="debug", skip(self, model), fields(model=%model.name, vars=model.vars.len(), constrs=model.constraints.len()))]
  fn solve(&self, model: &Model) -> Result<Solution> {
    use good_lp::{variables, variable, constraint, default_solver, Expression, ResolutionError, SolverModel};
    use good_lp::Solution as _;

    let mut problem_vars = variables!();
    let vars: Vec<good_lp::Variable> = model.vars.iter()
      .map(|v| {
        let def = variable().name(v.name.clone());
        let def = match v.domain {
          Domain::Binary => def.binary(),
          Domain::Unit => def.min(0.0).max(1.0),
        };
        problem_vars.add(def)
      })
      .collect();

    let linear = |terms: &[(Var, f64)]| -> Expression {
      terms.iter().map(|&(v, c)| c * vars[v.0]).sum()
    };

    let mut problem = problem_vars.minimise(linear(&model.objective)).using(default_solver);
    for c in &model.constraints {
      let lhs = linear(&c.lhs);
      problem = match c.sense {
        Sense::Eq => problem.with(constraint!(lhs == c.rhs)),
        Sense::Le => problem.with(constraint!(lhs <= c.rhs)),
        Sense::Ge => problem.with(constraint!(lhs >= c.rhs)),
      };
    }

    let solution = match problem.solve() {
      Ok(sol) => {
        let values: Vec<f64> = vars.iter().map(|&v| sol.value(v)).collect();
        Solution { status: SolveStatus::Optimal, values }
      },
      Err(ResolutionError::Infeasible) => Solution { status: SolveStatus::Infeasible, values: Vec::new() },
      Err(e) => Solution { status: SolveStatus::Error(e.to_string()), values: Vec::new() },
    };
    debug!(status=?solution.status);
    Ok(solution)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn pick_one(costs: &[f64]) -> (Model, Vec<Var>) {
    let mut model = Model::new("pick_one");
    let xs: Vec<_> = (0..costs.len()).map(|k| model.add_var(format!("x_{}", k), Domain::Binary)).collect();
    model.add_constr("one", xs.iter().map(|&x| (x, 1.0)).collect(), Sense::Eq, 1.0);
    model.set_objective(xs.iter().zip(costs).map(|(&x, &c)| (x, c)).collect());
    (model, xs)
  }

  #[test]
  fn picks_cheapest() -> Result<()> {
    let (model, xs) = pick_one(&[3.0, 1.0, 2.0]);
    let sol = GoodLp.solve(&model)?;
    assert_eq!(sol.status, SolveStatus::Optimal);
    assert!(sol.is_selected(xs[1]));
    assert!(!sol.is_selected(xs[0]));
    assert!((sol.objective(&model) - 1.0).abs() < 1e-6);
    assert!(model.constraints.iter().all(|c| c.is_satisfied(&sol.values, 1e-6)));
    Ok(())
  }

  #[test]
  fn reports_infeasible() -> Result<()> {
    let (mut model, xs) = pick_one(&[1.0, 1.0]);
    model.add_constr("two", xs.iter().map(|&x| (x, 1.0)).collect(), Sense::Ge, 2.0);
    let sol = GoodLp.solve(&model)?;
    assert_eq!(sol.status, SolveStatus::Infeasible);
    assert!(sol.values.is_empty());
    Ok(())
  }

  #[test]
  fn evaluate_objective() {
    let (model, _) = pick_one(&[3.0, 1.0]);
    assert_eq!(model.evaluate(&[1.0, 1.0]), 4.0);
    assert_eq!(model.var_name(Var(1)), "x_1");
    assert_eq!(model.num_vars(), 2);
  }
}
