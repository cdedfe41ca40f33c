//! Spread idle scouts over the best unexplored area

use std::f32::consts::TAU;

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
use crate::core::types::{EntityHandle, GridCoord};
use crate::spatial::GridLayout;
use crate::team::orders::Order;

#[derive(Debug, Default)]
pub struct ScoutingPlan {
    assigned: AHashSet<EntityHandle>,
}

impl ScoutingPlan {
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

/// The target plus up to `count - 1` points on a ring around it
///
/// Ring points falling outside the map are dropped, so fewer than `count`
/// cells may come back.
pub fn scout_ring(center: GridCoord, count: usize, radius: f32, layout: &GridLayout) -> Vec<GridCoord> {
    let mut cells = vec![center];
    for i in 1..count {
        let angle = i as f32 * (TAU / count as f32);
        let cell = center.offset(
            (angle.cos() * radius).round() as i32,
            (angle.sin() * radius).round() as i32,
        );
        if layout.contains(cell) {
            cells.push(cell);
        }
    }
    cells
}

impl Plan for ScoutingPlan {
    fn name(&self) -> &'static str {
        "scouting"
    }

    fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        _delta: f32,
        claimed: &mut ClaimedCells,
    ) -> PlanStatus {
        let beliefs = ctx.beliefs;
        let layout = *ctx.blackboard.vision().layout();

        let mut scouts: Vec<_> = beliefs.healthy_scouts.iter().filter(|s| s.is_idle()).collect();
        if scouts.is_empty() {
            return PlanStatus::Failure;
        }
        let Some(target) = beliefs.best_scout_target else {
            return PlanStatus::Failure;
        };

        let ring = scout_ring(target, scouts.len(), ctx.config.plans.scout_ring_radius, &layout);
        for cell in ring {
            if claimed.is_claimed(cell) {
                continue;
            }
            let point = layout.cell_center(cell);
            let Some(nearest) = scouts
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| OrderedFloat(s.position.distance(point)))
                .map(|(i, _)| i)
            else {
                break;
            };

            let scout = scouts.remove(nearest);
            claimed.claim(cell);
            ctx.issue(Order::move_to(scout.handle, point));
            self.assigned.insert(scout.handle);
        }

        if self.assigned.is_empty() {
            PlanStatus::Failure
        } else {
            PlanStatus::Running
        }
    }

    fn cleanup(&mut self) {
        self.assigned.clear();
    }
}
