//! Pull badly hurt units back to the nearest friendly camp

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
use crate::core::types::{EntityHandle, Vec2};
use crate::team::orders::Order;

#[derive(Debug, Default)]
pub struct RetreatPlan {
    assigned: AHashSet<EntityHandle>,
}

impl RetreatPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assigned(&self, unit: EntityHandle) -> bool {
        self.assigned.contains(&unit)
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }
}

impl Plan for RetreatPlan {
    fn name(&self) -> &'static str {
        "retreat"
    }

    fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        _delta: f32,
        claimed: &mut ClaimedCells,
    ) -> PlanStatus {
        let beliefs = ctx.beliefs;
        let threshold = ctx.config.beliefs.low_health_fraction;
        let jitter = ctx.config.plans.retreat_jitter;

        let wounded: Vec<_> = beliefs
            .units
            .iter()
            .filter(|u| u.health < u.max_health * threshold)
            .collect();
        if wounded.is_empty() {
            return PlanStatus::Success;
        }

        let camps: Vec<Vec2> = ctx
            .blackboard
            .location()
            .ally_camps()
            .map(|camp| camp.position)
            .collect();

        let mut retreated = 0;
        for unit in wounded {
            if !unit.is_idle() {
                continue;
            }

            let rally = camps
                .iter()
                .copied()
                .min_by_key(|camp| OrderedFloat(camp.distance(unit.position)))
                .unwrap_or(Vec2::ZERO);
            let destination = rally + ctx.jitter(jitter);

            if claimed.claim(ctx.cell_of(destination)) {
                ctx.issue(Order::move_to(unit.handle, destination));
                self.assigned.insert(unit.handle);
                retreated += 1;
            }
        }

        if retreated > 0 {
            PlanStatus::Running
        } else {
            PlanStatus::Success
        }
    }

    fn cleanup(&mut self) {
        self.assigned.clear();
    }
}
