pub use instances::dataset::dispatch::{
  Time,
  Loc,
  Req,
  Cart,
  TravelTimes,
};

use crate::dispatch::{Stop, StopKind};

pub type DispatchInstance = instances::dataset::dispatch::DispatchInstance;

pub trait DispatchInstanceExt {
  fn tt(&self, i: Loc, j: Loc) -> Time;
  fn pickup_loc(&self, r: Req) -> Loc;
  fn delivery_loc(&self, r: Req) -> Loc;
  fn stop_loc(&self, s: Stop) -> Loc;
  fn wip_name(&self, r: Req) -> &str;
}

impl DispatchInstanceExt for DispatchInstance {
    #[inline]
    fn tt(&self, i: Loc, j: Loc) -> Time {
        return self.travel_time.get(i, j);
    }

    #[inline]
    fn pickup_loc(&self, r: Req) -> Loc {
        return self.wip_from[r as usize];
    }

    #[inline]
    fn delivery_loc(&self, r: Req) -> Loc {
        return self.wip_to[r as usize];
    }

    #[inline]
    fn stop_loc(&self, s: Stop) -> Loc {
        match s.kind {
            StopKind::Pickup => self.pickup_loc(s.req),
            StopKind::Delivery => self.delivery_loc(s.req),
        }
    }

    #[inline]
    fn wip_name(&self, r: Req) -> &str {
        &self.wip_ids[r as usize]
    }
}
