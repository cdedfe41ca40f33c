//! Send small squads at the camps closest to the main force

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
use crate::blackboard::LocationRecord;
use crate::core::types::{EntityHandle, Vec2};
use crate::team::orders::Order;
use crate::team::roster::UnitSnapshot;

#[derive(Debug, Default)]
pub struct CapturePlan {
    assigned: AHashSet<EntityHandle>,
}

impl CapturePlan {
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

/// Mean position of the non-scout units, or the origin if there are none
pub fn forces_centroid(units: &[UnitSnapshot]) -> Vec2 {
    let (sum, count) = units
        .iter()
        .filter(|u| !u.archetype.is_scout())
        .fold((Vec2::ZERO, 0usize), |(sum, n), u| (sum + u.position, n + 1));
    if count == 0 {
        Vec2::ZERO
    } else {
        sum / count as f32
    }
}

impl Plan for CapturePlan {
    fn name(&self) -> &'static str {
        "capture"
    }

    fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        _delta: f32,
        claimed: &mut ClaimedCells,
    ) -> PlanStatus {
        let beliefs = ctx.beliefs;
        let board = ctx.blackboard;
        let config = ctx.config;
        let location = board.location();

        let mut camps: Vec<&LocationRecord> =
            location.neutral_camps().chain(location.enemy_camps()).collect();
        if camps.is_empty() {
            return PlanStatus::Success;
        }
        if beliefs.units.is_empty() {
            return PlanStatus::Failure;
        }

        let center = forces_centroid(&beliefs.units);
        camps.sort_by_key(|c| OrderedFloat(c.position.distance(center)));

        let attackers: Vec<&UnitSnapshot> = beliefs
            .healthy_attackers
            .iter()
            .filter(|a| a.is_idle())
            .collect();
        if attackers.is_empty() {
            return PlanStatus::Failure;
        }

        let tuning = &config.plans;
        let max_camps = camps.len().min(attackers.len() / 2);
        let mut next = 0;

        for camp in camps.iter().take(max_camps) {
            // a lost claim retries the same attacker with a fresh offset
            for _ in 0..tuning.units_per_camp {
                let Some(attacker) = attackers.get(next) else {
                    break;
                };
                let destination = camp.position + ctx.jitter(tuning.capture_jitter);
                if !claimed.claim(ctx.cell_of(destination)) {
                    continue;
                }

                ctx.issue(Order::move_to(attacker.handle, destination));
                self.assigned.insert(attacker.handle);
                next += 1;

                if attacker.position.distance(camp.position) < tuning.capture_strike_range {
                    ctx.issue(Order::attack(attacker.handle, camp.handle));
                }
            }
        }

        if next > 0 {
            PlanStatus::Running
        } else {
            PlanStatus::Failure
        }
    }

    fn cleanup(&mut self) {
        self.assigned.clear();
    }
}

#[cfg(all(test, feature = "sandbox"))]
mod tests {
    use super::*;
    use crate::bdi::plans::fixture::{Fixture, BLUE, RED};
    use crate::team::orders::OrderType;
    use crate::team::roster::UnitArchetype;

    #[test]
    fn test_centroid_ignores_scouts() {
        let units = vec![
            UnitSnapshot::new(EntityHandle::new(0, 0), UnitArchetype::Rifleman, Vec2::new(10.0, 0.0)),
            UnitSnapshot::new(EntityHandle::new(1, 0), UnitArchetype::Tanker, Vec2::new(30.0, 20.0)),
            UnitSnapshot::new(EntityHandle::new(2, 0), UnitArchetype::Scout, Vec2::new(900.0, 900.0)),
        ];
        assert_eq!(forces_centroid(&units), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_centroid_of_scouts_only_is_origin() {
        let units = vec![UnitSnapshot::new(
            EntityHandle::new(0, 0),
            UnitArchetype::Scout,
            Vec2::new(50.0, 50.0),
        )];
        assert_eq!(forces_centroid(&units), Vec2::ZERO);
    }

    #[test]
    fn test_nearest_camp_gets_the_squad() {
        let mut fx = Fixture::new();
        fx.config.plans.capture_jitter = 0.0;
        let near = fx.field.spawn_camp(None, Vec2::new(100.0, 0.0), 400.0);
        fx.field.spawn_camp(Some(RED), Vec2::new(-180.0, 0.0), 400.0);
        let a = fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(20.0, 0.0));
        fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(30.0, 0.0));
        fx.sight();

        let mut plan = CapturePlan::new();
        let (status, orders) = fx.run(&mut plan, 0.1, &mut ClaimedCells::new());

        // two attackers: one camp, and zero jitter lets only one claim its cell
        assert_eq!(status, PlanStatus::Running);
        assert!(plan.is_assigned(a));
        assert_eq!(plan.assigned_count(), 1);
        assert_eq!(orders[0].order_type, OrderType::MoveTo(Vec2::new(100.0, 0.0)));
        assert_eq!(orders[1].order_type, OrderType::Attack(near));
    }

    #[test]
    fn test_squad_counted_once_across_ticks() {
        let mut fx = Fixture::new();
        fx.config.plans.capture_jitter = 0.0;
        fx.field.spawn_camp(None, Vec2::new(120.0, 0.0), 400.0);
        let lead = fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::ZERO);
        fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(0.0, 40.0));
        fx.sight();

        let mut plan = CapturePlan::new();
        for _ in 0..3 {
            let (status, _) = fx.run(&mut plan, 0.1, &mut ClaimedCells::new());
            assert_eq!(status, PlanStatus::Running);
        }
        assert!(plan.is_assigned(lead));
        assert_eq!(plan.assigned_count(), 1);
    }

    #[test]
    fn test_single_attacker_cannot_capture() {
        let mut fx = Fixture::new();
        fx.field.spawn_camp(None, Vec2::new(100.0, 0.0), 400.0);
        fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(20.0, 0.0));
        fx.sight();

        let (status, orders) = fx.run(&mut CapturePlan::new(), 0.1, &mut ClaimedCells::new());
        assert_eq!(status, PlanStatus::Failure);
        assert!(orders.is_empty());
    }

    #[test]
    fn test_no_camps_is_success() {
        let mut fx = Fixture::new();
        fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::ZERO);
        fx.sight();

        let (status, _) = fx.run(&mut CapturePlan::new(), 0.1, &mut ClaimedCells::new());
        assert_eq!(status, PlanStatus::Success);
    }
}
