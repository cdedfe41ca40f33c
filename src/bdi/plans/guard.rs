//! Idle sweep: turn idle units now and then so they scan around

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
use crate::team::orders::Order;

#[derive(Debug)]
pub struct GuardPlan {
    timer: f32,
    interval: f32,
}

impl GuardPlan {
    pub fn new(interval: f32) -> Self {
        Self {
            timer: 0.0,
            interval,
        }
    }
}

impl Plan for GuardPlan {
    fn name(&self) -> &'static str {
        "guard"
    }

    fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        delta: f32,
        _claimed: &mut ClaimedCells,
    ) -> PlanStatus {
        self.timer += delta;
        if self.timer < self.interval {
            return PlanStatus::Running;
        }
        self.timer = 0.0;

        let beliefs = ctx.beliefs;
        let idle: Vec<_> = beliefs.units.iter().filter(|u| u.is_idle()).collect();
        if idle.is_empty() {
            return PlanStatus::Success;
        }

        for unit in idle {
            let angle = ctx.rng.gen_range(-FRAC_PI_2..=FRAC_PI_2);
            ctx.issue(Order::rotate(unit.handle, angle));
        }
        PlanStatus::Running
    }

    fn cleanup(&mut self) {
        self.timer = 0.0;
    }
}
