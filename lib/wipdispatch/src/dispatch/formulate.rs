use std::fmt;
use std::str::FromStr;
use tracing::*;

use crate::*;
use crate::config::CART_CAPACITY;
use crate::data::wip::*;
use super::{GroupInfo, GroupPrice, price_group};
use super::ip::{Model, Var, Domain, Sense, Solution};

/// One selected group together with the cart serving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
  pub cart: String,
  pub start: Loc,
  /// Index into `GroupInfo::groups`
  pub group: usize,
  pub price: GroupPrice,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FormulationKind {
  SetCover,
  CartRoute,
  CartItem,
}

impl Default for FormulationKind {
  fn default() -> Self { FormulationKind::SetCover }
}

impl FromStr for FormulationKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    return match s {
      "set-cover" => Ok(Self::SetCover),
      "cart-route" => Ok(Self::CartRoute),
      "cart-item" => Ok(Self::CartItem),
      _ => Err(format!("invalid string: {}", s))
    };
  }
}

impl fmt::Display for FormulationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::SetCover => "set-cover",
      Self::CartRoute => "cart-route",
      Self::CartItem => "cart-item",
    })
  }
}

pub const FORMULATION_STRINGS: [&str; 3] = ["set-cover", "cart-route", "cart-item"];

/// An integer program choosing which groups are served and by whom.
pub trait AssignmentModel: Sized {
  const KIND: FormulationKind;

  fn build(groups: &GroupInfo, cfg: &PlanConfig) -> Result<Self>;

  fn model(&self) -> &Model;

  /// Read the selected groups back from a solution of `self.model()`.
  fn decode(&self, groups: &GroupInfo, sol: &Solution) -> Result<Vec<Assignment>>;
}

fn group_var_suffix(data: &DispatchInstance, key: (Req, Req)) -> String {
  format!("{}_{}", data.wip_name(key.0), data.wip_name(key.1))
}

/// The carts used by the per-cart variants: the first `n / capacity` of the roster.
fn fleet(data: &DispatchInstance) -> &[Cart] {
  let k = (data.W.len() / CART_CAPACITY).min(data.C.len());
  if k < data.W.len() / CART_CAPACITY {
    warn!(carts=data.C.len(), needed=data.W.len() / CART_CAPACITY, "roster too small, model will be infeasible");
  }
  &data.C[..k]
}

fn cover_constraints(model: &mut Model, data: &DispatchInstance, covering: &[Vec<Var>]) {
  for (&r, vars) in data.W.iter().zip(covering) {
    model.add_constr(
      format!("cover_{}", data.wip_name(r)),
      vars.iter().map(|&v| (v, 1.0)).collect(),
      Sense::Eq,
      1.0,
    );
  }
}


/// One binary per group, every group priced from the first cart's location.  Cart identity is
/// recovered after the solve.
pub struct SetCover {
  model: Model,
  start: Loc,
  select: Vec<Var>,
  prices: Vec<GroupPrice>,
}

impl AssignmentModel for SetCover {
  const KIND: FormulationKind = FormulationKind::SetCover;

  #[instrument(level="info", name="build_set_cover", skip(groups, cfg))]
  fn build(groups: &GroupInfo, cfg: &PlanConfig) -> Result<Self> {
    let data = groups.data;
    let start = match data.cart_loc.first() {
      Some(&l) => l,
      None => return Err(Error::EmptyRoster.into()),
    };

    let mut model = Model::new("set_cover");
    let mut select = Vec::with_capacity(groups.len());
    let mut prices = Vec::with_capacity(groups.len());
    let mut objective = Vec::with_capacity(groups.len());
    let mut covering = vec![Vec::new(); data.W.len()];

    for g in &groups.groups {
      let price = price_group(data, g, start, cfg);
      let x = model.add_var(format!("select_{}", group_var_suffix(data, g.reqs)), Domain::Binary);
      objective.push((x, price.objective(&cfg.weights)));
      covering[g.reqs.0 as usize].push(x);
      covering[g.reqs.1 as usize].push(x);
      select.push(x);
      prices.push(price);
    }

    cover_constraints(&mut model, data, &covering);
    model.set_objective(objective);
    info!(vars=model.num_vars(), constrs=model.constraints.len(), "model built");
    Ok(SetCover { model, start, select, prices })
  }

  fn model(&self) -> &Model { &self.model }

  fn decode(&self, _groups: &GroupInfo, sol: &Solution) -> Result<Vec<Assignment>> {
    let assignments = self.select.iter()
      .enumerate()
      .filter(|&(_, &x)| sol.is_selected(x))
      .enumerate()
      .map(|(n, (k, _))| Assignment {
        cart: format!("C{:02}", n + 1),
        start: self.start,
        group: k,
        price: self.prices[k],
      })
      .collect();
    Ok(assignments)
  }
}


/// One binary per (cart, group), each cart serving at most one group.
pub struct CartRoute {
  model: Model,
  carts: Vec<Cart>,
  /// `route[c][k]` is the variable of the `c`-th fleet cart serving group `k`
  route: Vec<Vec<Var>>,
  prices: Vec<Vec<GroupPrice>>,
}

impl AssignmentModel for CartRoute {
  const KIND: FormulationKind = FormulationKind::CartRoute;

  #[instrument(level="info", name="build_cart_route", skip(groups, cfg))]
  fn build(groups: &GroupInfo, cfg: &PlanConfig) -> Result<Self> {
    let data = groups.data;
    let carts = fleet(data).to_vec();

    let mut model = Model::new("cart_route");
    let mut route = Vec::with_capacity(carts.len());
    let mut prices = Vec::with_capacity(carts.len());
    let mut objective = Vec::new();
    let mut covering = vec![Vec::new(); data.W.len()];

    for &c in &carts {
      let start = data.cart_loc[c as usize];
      let mut vars = Vec::with_capacity(groups.len());
      let mut cart_prices = Vec::with_capacity(groups.len());
      for g in &groups.groups {
        let price = price_group(data, g, start, cfg);
        let name = format!("route_{}_{}", data.cart_ids[c as usize], group_var_suffix(data, g.reqs));
        let x = model.add_var(name, Domain::Binary);
        objective.push((x, price.objective(&cfg.weights)));
        covering[g.reqs.0 as usize].push(x);
        covering[g.reqs.1 as usize].push(x);
        vars.push(x);
        cart_prices.push(price);
      }
      model.add_constr(
        format!("cart_{}", data.cart_ids[c as usize]),
        vars.iter().map(|&x| (x, 1.0)).collect(),
        Sense::Le,
        1.0,
      );
      route.push(vars);
      prices.push(cart_prices);
    }

    cover_constraints(&mut model, data, &covering);
    model.set_objective(objective);
    info!(vars=model.num_vars(), constrs=model.constraints.len(), "model built");
    Ok(CartRoute { model, carts, route, prices })
  }

  fn model(&self) -> &Model { &self.model }

  fn decode(&self, groups: &GroupInfo, sol: &Solution) -> Result<Vec<Assignment>> {
    let data = groups.data;
    let mut assignments = Vec::new();
    for (ci, &c) in self.carts.iter().enumerate() {
      for (k, &x) in self.route[ci].iter().enumerate() {
        if sol.is_selected(x) {
          assignments.push(Assignment {
            cart: data.cart_ids[c as usize].clone(),
            start: data.cart_loc[c as usize],
            group: k,
            price: self.prices[ci][k],
          });
        }
      }
    }
    Ok(assignments)
  }
}


/// One binary per (cart, item) with a McCormick-linearised pairing variable per (cart, group).
pub struct CartItem {
  model: Model,
  carts: Vec<Cart>,
  /// `assign[c][r]`
  assign: Vec<Vec<Var>>,
  prices: Vec<Vec<GroupPrice>>,
}

impl AssignmentModel for CartItem {
  const KIND: FormulationKind = FormulationKind::CartItem;

  #[instrument(level="info", name="build_cart_item", skip(groups, cfg))]
  fn build(groups: &GroupInfo, cfg: &PlanConfig) -> Result<Self> {
    let data = groups.data;
    let carts = fleet(data).to_vec();

    let mut model = Model::new("cart_item");
    let mut assign = Vec::with_capacity(carts.len());
    let mut prices = Vec::with_capacity(carts.len());
    let mut objective = Vec::new();
    let mut covering = vec![Vec::new(); data.W.len()];

    for &c in &carts {
      let cart_name = &data.cart_ids[c as usize];
      let start = data.cart_loc[c as usize];

      let x: Vec<Var> = data.W.iter()
        .map(|&r| model.add_var(format!("assign_{}_{}", cart_name, data.wip_name(r)), Domain::Binary))
        .collect();
      for (r, &v) in x.iter().enumerate() {
        covering[r].push(v);
      }
      model.add_constr(
        format!("capacity_{}", cart_name),
        x.iter().map(|&v| (v, 1.0)).collect(),
        Sense::Eq,
        CART_CAPACITY as f64,
      );

      let mut cart_prices = Vec::with_capacity(groups.len());
      for g in &groups.groups {
        let price = price_group(data, g, start, cfg);
        let suffix = format!("{}_{}", cart_name, group_var_suffix(data, g.reqs));
        let z = model.add_var(format!("pair_{}", suffix), Domain::Unit);
        let (x1, x2) = (x[g.reqs.0 as usize], x[g.reqs.1 as usize]);
        model.add_constr(format!("pair_ub1_{}", suffix), vec![(z, 1.0), (x1, -1.0)], Sense::Le, 0.0);
        model.add_constr(format!("pair_ub2_{}", suffix), vec![(z, 1.0), (x2, -1.0)], Sense::Le, 0.0);
        model.add_constr(format!("pair_lb_{}", suffix), vec![(z, 1.0), (x1, -1.0), (x2, -1.0)], Sense::Ge, -1.0);
        objective.push((z, price.objective(&cfg.weights)));
        cart_prices.push(price);
      }
      assign.push(x);
      prices.push(cart_prices);
    }

    cover_constraints(&mut model, data, &covering);
    model.set_objective(objective);
    info!(vars=model.num_vars(), constrs=model.constraints.len(), "model built");
    Ok(CartItem { model, carts, assign, prices })
  }

  fn model(&self) -> &Model { &self.model }

  fn decode(&self, groups: &GroupInfo, sol: &Solution) -> Result<Vec<Assignment>> {
    let data = groups.data;
    let mut assignments = Vec::with_capacity(self.carts.len());
    for (ci, &c) in self.carts.iter().enumerate() {
      let items: Vec<Req> = self.assign[ci].iter()
        .enumerate()
        .filter(|&(_, &x)| sol.is_selected(x))
        .map(|(r, _)| r as Req)
        .collect();
      let cart = &data.cart_ids[c as usize];

      if items.len() != CART_CAPACITY {
        let msg = format!("cart {} carries {} items", cart, items.len());
        return Err(Error::MalformedSelection(msg).into());
      }
      let k = match groups.index_of((items[0], items[1])) {
        Some(k) => k,
        None => return Err(Error::MalformedSelection(format!("cart {} has no group", cart)).into()),
      };
      assignments.push(Assignment {
        cart: cart.clone(),
        start: data.cart_loc[c as usize],
        group: k,
        price: self.prices[ci][k],
      });
    }
    Ok(assignments)
  }
}
