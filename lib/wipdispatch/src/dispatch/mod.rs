use tracing::*;

use crate::*;
use crate::config::CART_CAPACITY;
use crate::data::wip::*;

pub mod enumerate;
pub mod price;
pub mod ip;
pub mod formulate;
pub mod reconstruct;
pub mod audit;
mod planner;

pub use enumerate::{generate_groups, Group, GroupInfo, GroupKey};
pub use price::{price_group, GroupPrice};
pub use formulate::{FormulationKind, AssignmentModel, Assignment};
pub use reconstruct::{reconstruct, Action, PlanRow, RoutePlan};
pub use audit::{Objective, evaluate};
pub use planner::{plan, Plan};

/// Number of stops in a group's ordering.
pub const GROUP_STOPS: usize = 2 * CART_CAPACITY;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StopKind {
    Pickup,
    Delivery,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Stop {
    pub req: Req,
    pub kind: StopKind,
}

impl Stop {
    #[inline]
    pub fn pickup(req: Req) -> Self { Stop { req, kind: StopKind::Pickup } }

    #[inline]
    pub fn delivery(req: Req) -> Self { Stop { req, kind: StopKind::Delivery } }
}

/// Which item is delivered first/second and when, relative to the first pickup.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArrivalProfile {
    pub order: [Req; CART_CAPACITY],
    pub time: [Time; CART_CAPACITY],
}

impl ArrivalProfile {
    #[inline]
    pub fn first_time(&self) -> Time { self.time[0] }

    #[inline]
    pub fn last_time(&self) -> Time { self.time[CART_CAPACITY - 1] }
}

/// A precedence-feasible ordering of a group's stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub stops: [Stop; GROUP_STOPS],
    /// `cum_time[m]` is the travel time from `stops[0]` to `stops[m]`
    pub cum_time: [Time; GROUP_STOPS],
    pub arrival: ArrivalProfile,
}

impl Path {
    #[inline]
    pub fn first_pickup(&self) -> Req {
        debug_assert_eq!(self.stops[0].kind, StopKind::Pickup);
        self.stops[0].req
    }

    /// Item visited at each stop.
    pub fn items(&self) -> [Req; GROUP_STOPS] {
        let mut items = [0; GROUP_STOPS];
        for (k, s) in self.stops.iter().enumerate() {
            items[k] = s.req;
        }
        items
    }

    /// Travel time from `start` to the first pickup.
    #[inline]
    pub fn lead_time(&self, data: &DispatchInstance, start: Loc) -> Time {
        data.tt(start, data.pickup_loc(self.first_pickup()))
    }

    /// Completion time of the last delivery when a cart leaves `start` at time 0.
    #[inline]
    pub fn total_cost(&self, data: &DispatchInstance, start: Loc) -> Time {
        self.lead_time(data, start) + self.arrival.last_time()
    }

    /// Lateness of each delivery event, in delivery order, when a cart leaves `start` at time 0.
    pub fn lateness(&self, data: &DispatchInstance, start: Loc) -> [Time; CART_CAPACITY] {
        let lead = self.lead_time(data, start);
        let mut late = [0.0; CART_CAPACITY];
        for k in 0..CART_CAPACITY {
            let r = self.arrival.order[k] as usize;
            late[k] = lead + self.arrival.time[k] - data.wip_qtime[r];
        }
        late
    }

    #[inline]
    pub fn penalty(&self, data: &DispatchInstance, start: Loc) -> Time {
        self.lateness(data, start).iter().map(|&l| l.max(0.0)).sum()
    }
}

pub mod schedule {
    use super::*;
    use itertools::Itertools;

    /// True if every delivery in `stops` comes after the pickup of the same item.
    pub fn precedence_ok(stops: &[Stop]) -> bool {
        let mut picked: Vec<Req> = Vec::with_capacity(stops.len() / 2);
        for s in stops {
            match s.kind {
                StopKind::Pickup => picked.push(s.req),
                StopKind::Delivery => if !picked.contains(&s.req) {
                    return false;
                },
            }
        }
        return true;
    }

    /// Cumulative travel time along `stops`, starting from 0 at the first stop.
    #[instrument(level="trace", skip(data))]
    pub fn cumulative(stops: &[Stop], data: &DispatchInstance) -> Vec<Time> {
        let mut cum = Vec::with_capacity(stops.len());
        let mut t = 0.0;
        cum.push(t);
        for (&i, &j) in stops.iter().tuple_windows() {
            t += data.tt(data.stop_loc(i), data.stop_loc(j));
            cum.push(t);
        }
        trace!(?cum);
        return cum;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence() {
        assert!(schedule::precedence_ok(&[Stop::pickup(0), Stop::pickup(1), Stop::delivery(1), Stop::delivery(0)]));
        assert!(schedule::precedence_ok(&[Stop::pickup(0), Stop::delivery(0), Stop::pickup(1), Stop::delivery(1)]));
        assert!(!schedule::precedence_ok(&[Stop::pickup(0), Stop::delivery(1), Stop::pickup(1), Stop::delivery(0)]));
        assert!(!schedule::precedence_ok(&[Stop::delivery(0), Stop::pickup(0)]));
    }

    #[test]
    fn cumulative_times() -> anyhow::Result<()> {
        use crate::data::{instance_from_csv, fixtures::*};
        let data = instance_from_csv(AB_TIMES, AB_CARTS, AB_WIPS)?;
        let stops = [Stop::pickup(0), Stop::delivery(0), Stop::pickup(1), Stop::delivery(1)];
        assert_eq!(schedule::cumulative(&stops, &data), vec![0.0, 5.0, 5.0, 10.0]);
        Ok(())
    }
}
