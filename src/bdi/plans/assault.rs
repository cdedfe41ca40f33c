//! Coordinated assault on the best attack target
//!
//! Two phases run every tick and never wait on each other:
//! - march: idle attackers nearest the target (plus the commander) move on it
//! - attack: attackers not yet engaged open fire at the nearest valid target
//!
//! Target search falls back from the forward cone to the awareness circle to
//! the team's location index; a tier is consulted only if the previous one
//! found nothing.

use ahash::AHashSet;
use ordered_float::OrderedFloat;

use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
use crate::blackboard::EntityKind;
use crate::core::types::{EntityHandle, Vec2};
use crate::team::orders::Order;
use crate::team::roster::UnitSnapshot;
use crate::team::view::Sense;

#[derive(Debug, Default)]
pub struct AssaultPlan {
    marching: AHashSet<EntityHandle>,
    attacking: AHashSet<EntityHandle>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    handle: EntityHandle,
    position: Vec2,
    is_unit: bool,
}

impl AssaultPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_marching(&self, unit: EntityHandle) -> bool {
        self.marching.contains(&unit)
    }

    pub fn is_attacking(&self, unit: EntityHandle) -> bool {
        self.attacking.contains(&unit)
    }

    fn march(&mut self, ctx: &mut PlanContext<'_>, claimed: &mut ClaimedCells) {
        let beliefs = ctx.beliefs;
        let board = ctx.blackboard;
        let tuning = &ctx.config.plans;
        let (squad_size, jitter) = (tuning.squad_size, tuning.march_jitter);

        let Some(region) = beliefs.best_attack_target else {
            return;
        };
        let target = board.influence().layout().cell_center(region);

        let mut squad: Vec<&UnitSnapshot> = beliefs
            .healthy_attackers
            .iter()
            .filter(|a| a.is_idle())
            .collect();
        squad.sort_by_key(|a| OrderedFloat(a.position.distance(target)));
        squad.truncate(squad_size);

        if let Some(commander) = beliefs.units.iter().find(|u| u.archetype.is_commander()) {
            if !squad.iter().any(|u| u.handle == commander.handle) {
                squad.push(commander);
            }
        }

        for unit in squad {
            if self.marching.contains(&unit.handle) {
                continue;
            }
            let destination = target + ctx.jitter(jitter);
            if claimed.claim(ctx.cell_of(destination)) {
                ctx.issue(Order::move_to(unit.handle, destination));
                self.marching.insert(unit.handle);
            }
        }
    }

    fn attack(&mut self, ctx: &mut PlanContext<'_>) {
        let beliefs = ctx.beliefs;
        let squad_size = ctx.config.plans.squad_size;

        let candidates: Vec<&UnitSnapshot> = beliefs
            .healthy_attackers
            .iter()
            .filter(|a| !self.attacking.contains(&a.handle))
            .take(squad_size)
            .collect();

        for unit in candidates {
            if unit.attack_target.is_some() {
                continue;
            }
            if let Some(target) = find_target(ctx, unit) {
                ctx.issue(Order::attack(unit.handle, target));
                self.attacking.insert(unit.handle);
            }
        }
    }
}

/// Nearest valid target for `unit`, enemy units before camps
fn find_target(ctx: &PlanContext<'_>, unit: &UnitSnapshot) -> Option<EntityHandle> {
    let mut found: Vec<Candidate> = Vec::new();

    for sense in [Sense::Cone, Sense::Circle] {
        found = ctx
            .world
            .perceive(unit.handle, sense)
            .into_iter()
            .filter(|p| p.is_hostile_target())
            .map(|p| Candidate {
                handle: p.handle,
                position: p.position,
                is_unit: p.is_unit(),
            })
            .collect();
        if !found.is_empty() {
            break;
        }
    }

    if found.is_empty() {
        let location = ctx.blackboard.location();
        let tuning = &ctx.config.plans;
        let from = unit.position;

        let units = location
            .enemies_within(from, tuning.assault_unit_range)
            .map(|r| (r, true));
        let enemy_camps = location
            .statics_within(EntityKind::EnemyCamp, from, tuning.assault_enemy_camp_range)
            .map(|r| (r, false));
        let neutral_camps = location
            .statics_within(EntityKind::NeutralCamp, from, tuning.assault_neutral_camp_range)
            .map(|r| (r, false));

        found = units
            .chain(enemy_camps)
            .chain(neutral_camps)
            .map(|(r, is_unit)| Candidate {
                handle: r.handle,
                position: r.position,
                is_unit,
            })
            .collect();
    }

    found
        .into_iter()
        .min_by_key(|c| (!c.is_unit, OrderedFloat(c.position.distance(unit.position))))
        .map(|c| c.handle)
}

impl Plan for AssaultPlan {
    fn name(&self) -> &'static str {
        "assault"
    }

    fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        _delta: f32,
        claimed: &mut ClaimedCells,
    ) -> PlanStatus {
        self.march(ctx, claimed);
        self.attack(ctx);

        if self.marching.is_empty() && self.attacking.is_empty() {
            PlanStatus::Success
        } else {
            PlanStatus::Running
        }
    }

    fn cleanup(&mut self) {
        self.marching.clear();
        self.attacking.clear();
    }
}
