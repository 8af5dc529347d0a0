use tracing::*;

use crate::*;
use crate::config::CART_CAPACITY;
use crate::data::wip::*;
use super::{generate_groups, reconstruct, GroupInfo, RoutePlan, Assignment, Objective};
use super::audit::evaluate_instance;
use super::formulate::{AssignmentModel, FormulationKind, SetCover, CartRoute, CartItem};
use super::ip::{Solver, SolveStatus};

/// Result of one planning run.
#[derive(Debug, Clone)]
pub struct Plan {
  pub kind: FormulationKind,
  pub routes: RoutePlan,
  pub assignments: Vec<Assignment>,
  /// Objective value of the solved model
  pub predicted: f64,
  /// Objective recomputed from `routes`
  pub audit: Objective,
  pub num_groups: usize,
  pub num_vars: usize,
  pub num_constrs: usize,
}

impl Plan {
  fn empty(kind: FormulationKind) -> Self {
    Plan {
      kind,
      routes: RoutePlan::default(),
      assignments: Vec::new(),
      predicted: 0.0,
      audit: Objective::default(),
      num_groups: 0,
      num_vars: 0,
      num_constrs: 0,
    }
  }

  pub fn to_json_summary(&self) -> json::JsonValue {
    json::object! {
      formulation: self.kind.to_string(),
      groups: self.num_groups,
      vars: self.num_vars,
      constrs: self.num_constrs,
      carts: self.assignments.len(),
      predicted: self.predicted,
      audit: self.audit.to_json(),
    }
  }
}

fn check_batch(data: &DispatchInstance) -> Result<()> {
  if data.W.len() % CART_CAPACITY != 0 {
    error!(items=data.W.len(), "batch cannot be split into full carts");
    return Err(Error::IndivisibleBatch { items: data.W.len(), capacity: CART_CAPACITY }.into());
  }
  Ok(())
}

fn check_coverage(groups: &GroupInfo, assignments: &[Assignment]) -> Result<()> {
  let data = groups.data;
  let mut count = vec![0usize; data.W.len()];
  for a in assignments {
    let g = &groups.groups[a.group];
    count[g.reqs.0 as usize] += 1;
    count[g.reqs.1 as usize] += 1;
  }
  if let Some(r) = count.iter().position(|&c| c != 1) {
    let msg = format!("{} is served {} times", data.wip_name(r as Req), count[r]);
    return Err(Error::MalformedSelection(msg).into());
  }
  Ok(())
}

fn check_objective(predicted: f64, audit: &Objective, cfg: &PlanConfig) -> Result<()> {
  let tol = cfg.cost_tolerance * predicted.abs().max(1.0);
  if (audit.total_cost - predicted).abs() <= tol {
    return Ok(());
  }
  match cfg.penalty_policy {
    PenaltyPolicy::Joint => {
      error!(predicted, audited=audit.total_cost, "plan does not realise the model objective");
      Err(Error::ObjectiveMismatch { predicted, audited: audit.total_cost }.into())
    },
    PenaltyPolicy::Independent => {
      warn!(predicted, audited=audit.total_cost, "plan objective differs from the optimistic model objective");
      Ok(())
    },
  }
}

fn plan_with<F: AssignmentModel>(data: &DispatchInstance, cfg: &PlanConfig, solver: &dyn Solver) -> Result<Plan> {
  check_batch(data)?;
  if data.W.is_empty() {
    info!("empty batch");
    return Ok(Plan::empty(F::KIND));
  }

  let groups = generate_groups(data);
  let formulation = F::build(&groups, cfg)?;
  let model = formulation.model();
  let sol = solver.solve(model)?;
  match &sol.status {
    SolveStatus::Optimal => {},
    SolveStatus::Infeasible => return Err(Error::Infeasible.into()),
    SolveStatus::Error(msg) => return Err(Error::SolverFailure(msg.clone()).into()),
  }
  let predicted = sol.objective(model);
  info!(predicted, "solved");

  let assignments = formulation.decode(&groups, &sol)?;
  check_coverage(&groups, &assignments)?;
  let routes = reconstruct(&groups, &assignments, cfg)?;
  let audit = evaluate_instance(&routes, data, &cfg.weights);
  check_objective(predicted, &audit, cfg)?;

  Ok(Plan {
    kind: F::KIND,
    num_groups: groups.len(),
    num_vars: model.num_vars(),
    num_constrs: model.constraints.len(),
    routes,
    assignments,
    predicted,
    audit,
  })
}

/// Enumerate, price, solve and reconstruct one batch.
#[instrument(level="info", skip(data, cfg, solver), fields(instance=%data.id))]
pub fn plan(data: &DispatchInstance, kind: FormulationKind, cfg: &PlanConfig, solver: &dyn Solver) -> Result<Plan> {
  match kind {
    FormulationKind::SetCover => plan_with::<SetCover>(data, cfg, solver),
    FormulationKind::CartRoute => plan_with::<CartRoute>(data, cfg, solver),
    FormulationKind::CartItem => plan_with::<CartItem>(data, cfg, solver),
  }
}
