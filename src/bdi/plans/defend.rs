//! Ring the base with defenders and engage anything close

use std::f32::consts::TAU;

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
use crate::core::types::{EntityHandle, Vec2};
use crate::team::orders::Order;

#[derive(Debug, Default)]
pub struct DefendCampPlan {
    assigned: AHashSet<EntityHandle>,
}

impl DefendCampPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assigned(&self, unit: EntityHandle) -> bool {
        self.assigned.contains(&unit)
    }
}

/// Evenly spaced points on a circle, starting at angle 0
pub fn perimeter_posts(center: Vec2, radius: f32, count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * (TAU / count as f32);
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

impl Plan for DefendCampPlan {
    fn name(&self) -> &'static str {
        "defend_camp"
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
        let tuning = &config.plans;

        let Some(base) = beliefs.team_base_position else {
            return PlanStatus::Failure;
        };
        let defenders = &beliefs.healthy_attackers;
        if defenders.is_empty() {
            return PlanStatus::Failure;
        }

        let posts = defenders.len().min(tuning.defend_max_posts);
        let engage_range = tuning.defend_engage_range;
        let mut deployed = 0;

        for post in perimeter_posts(base, tuning.defend_radius, posts) {
            let Some(defender) = defenders
                .iter()
                .filter(|d| d.is_idle() && !self.assigned.contains(&d.handle))
                .min_by_key(|d| OrderedFloat(d.position.distance(post)))
            else {
                continue;
            };

            if !claimed.claim(ctx.cell_of(post)) {
                continue;
            }

            ctx.issue(Order::move_to(defender.handle, post));
            self.assigned.insert(defender.handle);
            deployed += 1;

            let nearest_enemy = location
                .enemies_within(defender.position, engage_range)
                .min_by_key(|e| OrderedFloat(e.position.distance(defender.position)));
            if let Some(enemy) = nearest_enemy {
                ctx.issue(Order::attack(defender.handle, enemy.handle));
            }
        }

        if deployed > 0 {
            PlanStatus::Running
        } else {
            PlanStatus::Success
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
    fn test_posts_on_circle() {
        let posts = perimeter_posts(Vec2::new(10.0, 10.0), 60.0, 4);
        assert_eq!(posts.len(), 4);
        assert!((posts[0] - Vec2::new(70.0, 10.0)).length() < 1e-3);
        assert!((posts[1] - Vec2::new(10.0, 70.0)).length() < 1e-3);
        for post in posts {
            assert!((post.distance(Vec2::new(10.0, 10.0)) - 60.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_no_base_fails() {
        let mut fx = Fixture::new();
        fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::ZERO);
        fx.sight();

        let (status, orders) = fx.run(&mut DefendCampPlan::new(), 0.1, &mut ClaimedCells::new());
        assert_eq!(status, PlanStatus::Failure);
        assert!(orders.is_empty());
    }

    #[test]
    fn test_defenders_take_posts_and_engage() {
        let mut fx = Fixture::new();
        fx.field.spawn_camp(Some(BLUE), Vec2::new(8.0, 8.0), 1000.0);
        let a = fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(100.0, 8.0));
        let b = fx.field.spawn_unit(BLUE, UnitArchetype::Sniper, Vec2::new(8.0, 100.0));
        let raider = fx.field.spawn_unit(RED, UnitArchetype::Rifleman, Vec2::new(120.0, 8.0));
        fx.sight();

        let mut plan = DefendCampPlan::new();
        let (status, orders) = fx.run(&mut plan, 0.1, &mut ClaimedCells::new());

        assert_eq!(status, PlanStatus::Running);
        assert!(plan.is_assigned(a));
        assert!(plan.is_assigned(b));
        let moves = orders.iter().filter(|o| o.is_move()).count();
        assert_eq!(moves, 2);
        assert!(orders
            .iter()
            .any(|o| o.unit == a && o.order_type == OrderType::Attack(raider)));
    }

    #[test]
    fn test_assigned_defenders_not_reused() {
        let mut fx = Fixture::new();
        fx.field.spawn_camp(Some(BLUE), Vec2::new(8.0, 8.0), 1000.0);
        fx.field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(100.0, 8.0));
        fx.sight();

        let mut plan = DefendCampPlan::new();
        let mut claimed = ClaimedCells::new();
        let (first, _) = fx.run(&mut plan, 0.1, &mut claimed);
        let (second, orders) = fx.run(&mut plan, 0.1, &mut claimed);
        assert_eq!(first, PlanStatus::Running);
        assert_eq!(second, PlanStatus::Success);
        assert!(orders.is_empty());
    }
}
