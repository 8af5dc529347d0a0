use itertools::Itertools;
use tracing::*;

use crate::*;
use crate::config::CART_CAPACITY;
use crate::data::wip::*;
use super::{schedule, Stop, StopKind, Path, ArrivalProfile, GROUP_STOPS};

/// Unordered pair of items, stored in batch order.
pub type GroupKey = (Req, Req);

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
  pub reqs: GroupKey,
  /// Valid orderings, in enumeration order
  pub paths: Vec<Path>,
}

impl Group {
  #[inline]
  pub fn contains(&self, r: Req) -> bool {
    self.reqs.0 == r || self.reqs.1 == r
  }
}

pub struct GroupInfo<'a> {
  pub data: &'a DispatchInstance,
  /// Groups in combination order of the batch
  pub groups: Vec<Group>,
  /// `containing[r]` lists the indices of groups which contain item `r`
  pub containing: Vec<Vec<usize>>,
  index: Map<GroupKey, usize>,
}

impl<'a> GroupInfo<'a> {
  pub fn index_of(&self, key: GroupKey) -> Option<usize> {
    let key = if key.0 <= key.1 { key } else { (key.1, key.0) };
    self.index.get(&key).copied()
  }

  pub fn len(&self) -> usize { self.groups.len() }

  pub fn is_empty(&self) -> bool { self.groups.is_empty() }
}


fn build_path(data: &DispatchInstance, perm: &[Stop]) -> Path {
  let mut stops = [perm[0]; GROUP_STOPS];
  stops.copy_from_slice(perm);

  let cum = schedule::cumulative(perm, data);
  let mut cum_time = [0.0; GROUP_STOPS];
  cum_time.copy_from_slice(&cum);

  // stable sort: equal arrival times keep their order along the path
  let deliveries: Vec<(Req, Time)> = stops.iter()
    .zip(cum_time.iter())
    .filter(|(s, _)| s.kind == StopKind::Delivery)
    .map(|(s, &t)| (s.req, t))
    .sorted_by(|a, b| a.1.total_cmp(&b.1))
    .collect();
  debug_assert_eq!(deliveries.len(), CART_CAPACITY);

  let mut arrival = ArrivalProfile { order: [0; CART_CAPACITY], time: [0.0; CART_CAPACITY] };
  for (k, (r, t)) in deliveries.into_iter().enumerate() {
    arrival.order[k] = r;
    arrival.time[k] = t;
  }

  Path { stops, cum_time, arrival }
}

/// All precedence-feasible orderings of the stops of `r1` and `r2`.
#[instrument(level="trace", skip(data))]
pub fn enumerate_paths(data: &DispatchInstance, r1: Req, r2: Req) -> Vec<Path> {
  let stops = [Stop::pickup(r1), Stop::delivery(r1), Stop::pickup(r2), Stop::delivery(r2)];
  let paths: Vec<Path> = stops.iter()
    .copied()
    .permutations(GROUP_STOPS)
    .filter(|perm| schedule::precedence_ok(perm))
    .map(|perm| build_path(data, &perm))
    .collect();
  trace!(count=paths.len(), "paths");
  return paths;
}

#[instrument(level="info", skip(data), fields(instance=%data.id))]
pub fn generate_groups(data: &DispatchInstance) -> GroupInfo<'_> {
  let groups: Vec<Group> = data.W.iter()
    .tuple_combinations()
    .map(|(&r1, &r2)| Group { reqs: (r1, r2), paths: enumerate_paths(data, r1, r2) })
    .collect();

  let mut containing = vec![Vec::new(); data.W.len()];
  let mut index = Map::with_capacity_and_hasher(groups.len(), Default::default());
  for (k, g) in groups.iter().enumerate() {
    containing[g.reqs.0 as usize].push(k);
    containing[g.reqs.1 as usize].push(k);
    index.insert(g.reqs, k);
  }

  info!(count=groups.len(), "{:?} groups generated", groups.len());
  return GroupInfo { data, groups, containing, index };
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::{instance_from_csv, fixtures::*};
  use crate::init_test_logging;
  use anyhow::Result;
  use proptest::prelude::*;

  #[test]
  fn six_of_twenty_four() -> Result<()> {
    init_test_logging(None::<&str>);
    let data = instance_from_csv(AB_TIMES, AB_CARTS, AB_WIPS)?;
    let paths = enumerate_paths(&data, 0, 1);
    assert_eq!(paths.len(), 6);
    for p in &paths {
      assert!(schedule::precedence_ok(&p.stops));
    }
    let distinct: Set<_> = paths.iter().map(|p| p.stops).collect();
    assert_eq!(distinct.len(), 6);
    Ok(())
  }

  #[test]
  fn arrival_profile() -> Result<()> {
    let data = instance_from_csv(AB_TIMES, AB_CARTS, AB_WIPS)?;
    let paths = enumerate_paths(&data, 0, 1);
    // P1 D1 P2 D2 : A -> B -> B -> A
    let p = paths.iter()
      .find(|p| p.stops == [Stop::pickup(0), Stop::delivery(0), Stop::pickup(1), Stop::delivery(1)])
      .unwrap();
    assert_eq!(p.cum_time, [0.0, 5.0, 5.0, 10.0]);
    assert_eq!(p.arrival, ArrivalProfile { order: [0, 1], time: [5.0, 10.0] });
    assert_eq!(p.items(), [0, 0, 1, 1]);
    Ok(())
  }

  #[test]
  fn arrival_ties_keep_path_order() -> Result<()> {
    // both items delivered to B, so consecutive deliveries tie
    let wips = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,A,B,10\nW2,A,B,10\n";
    let data = instance_from_csv(AB_TIMES, AB_CARTS, wips)?;
    let paths = enumerate_paths(&data, 0, 1);

    let p = paths.iter()
      .find(|p| p.stops == [Stop::pickup(0), Stop::pickup(1), Stop::delivery(1), Stop::delivery(0)])
      .unwrap();
    assert_eq!(p.arrival, ArrivalProfile { order: [1, 0], time: [5.0, 5.0] });

    let p = paths.iter()
      .find(|p| p.stops == [Stop::pickup(1), Stop::pickup(0), Stop::delivery(0), Stop::delivery(1)])
      .unwrap();
    assert_eq!(p.arrival, ArrivalProfile { order: [0, 1], time: [5.0, 5.0] });
    Ok(())
  }

  #[test]
  fn enumeration_order() -> Result<()> {
    let data = instance_from_csv(AB_TIMES, AB_CARTS, AB_WIPS)?;
    let items: Vec<_> = enumerate_paths(&data, 0, 1).iter().map(|p| p.items()).collect();
    assert_eq!(items, vec![
      [0, 0, 1, 1],
      [0, 1, 0, 1],
      [0, 1, 1, 0],
      [1, 0, 0, 1],
      [1, 0, 1, 0],
      [1, 1, 0, 0],
    ]);
    Ok(())
  }

  #[test]
  fn group_index() -> Result<()> {
    let wips = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,A,B,1\nW2,B,A,1\nW3,A,B,1\nW4,B,A,1\n";
    let data = instance_from_csv(AB_TIMES, AB_CARTS, wips)?;
    let info = generate_groups(&data);
    assert_eq!(info.len(), 6);
    assert_eq!(info.groups[0].reqs, (0, 1));
    assert_eq!(info.groups[5].reqs, (2, 3));
    assert_eq!(info.index_of((3, 1)), Some(4));
    for (r, gs) in info.containing.iter().enumerate() {
      assert_eq!(gs.len(), 3);
      assert!(gs.iter().all(|&g| info.groups[g].contains(r as Req)));
    }
    Ok(())
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]
    #[test]
    fn paths_are_valid(times in prop::collection::vec(0u32..20, 16)) {
      let mut csv = String::from("FROM,TO,XFER_TIME\n");
      for (k, t) in times.iter().enumerate() {
        csv.push_str(&format!("LOC{},LOC{},{}\n", k / 4, k % 4, t));
      }
      let wips = "WIP_ID,FROM,TO,Remaining Q-Time\nW1,LOC0,LOC1,0\nW2,LOC2,LOC3,0\n";
      let data = instance_from_csv(&csv, "CART_ID,INIT_LOC\nC1,LOC0\n", wips).unwrap();
      let paths = enumerate_paths(&data, 0, 1);
      prop_assert_eq!(paths.len(), 6);
      for p in &paths {
        prop_assert_eq!(p.stops[0].kind, StopKind::Pickup);
        prop_assert_eq!(p.stops[GROUP_STOPS - 1].kind, StopKind::Delivery);
        prop_assert!(p.cum_time.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(p.arrival.time[0] <= p.arrival.time[1]);
        prop_assert_eq!(p.arrival.last_time(), p.cum_time[GROUP_STOPS - 1]);
      }
    }
  }
}
