//! Desire library: what the commander may want, and how much
//!
//! Six desires in fixed priority order. Each answers three questions against
//! the current beliefs: is it relevant, how useful is it, and which plan
//! pursues it.

use serde::{Deserialize, Serialize};

use crate::bdi::beliefs::BeliefBase;
use crate::bdi::plan::Plan;
use crate::bdi::plans::{
    AssaultPlan, CapturePlan, DefendCampPlan, GuardPlan, RetreatPlan, ScoutingPlan,
};
use crate::core::config::CommanderConfig;

const SURVIVAL_UTILITY: f32 = 100.0;
const DEFEND_UTILITY: f32 = 65.0;
const DEFEND_THREAT_BONUS: f32 = 5.0;
const SCOUT_UTILITY: f32 = 70.0;
/// Unexplored cells at which scouting reaches full utility
const SCOUT_SATURATION: f32 = 20.0;
const ATTACK_UTILITY: f32 = 70.0;
const COMMANDER_BONUS: f32 = 30.0;
/// Attackers (and hotspots) at which the attack term saturates
const ATTACK_SATURATION: f32 = 5.0;
const CAPTURE_UTILITY: f32 = 65.0;
const CAPTURE_PER_CAMP: f32 = 0.1;
const GUARD_UTILITY: f32 = 10.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DesireKind {
    Survival,
    DefendCamp,
    Scout,
    Attack,
    Capture,
    Guard,
}

impl DesireKind {
    /// Evaluation order; earlier entries win utility ties
    pub const PRIORITY: [DesireKind; 6] = [
        DesireKind::Survival,
        DesireKind::DefendCamp,
        DesireKind::Scout,
        DesireKind::Attack,
        DesireKind::Capture,
        DesireKind::Guard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DesireKind::Survival => "survival",
            DesireKind::DefendCamp => "defend_camp",
            DesireKind::Scout => "scout",
            DesireKind::Attack => "attack",
            DesireKind::Capture => "capture",
            DesireKind::Guard => "guard",
        }
    }

    pub fn is_relevant(&self, beliefs: &BeliefBase) -> bool {
        match self {
            DesireKind::Survival => beliefs.low_health_units_present && beliefs.team_base.is_some(),
            DesireKind::DefendCamp => beliefs.camp_under_attack,
            DesireKind::Scout => beliefs.scouting_needed && beliefs.healthy_scout_count() >= 1,
            DesireKind::Attack => {
                (beliefs.march_opportunity || beliefs.sees_enemy_commander)
                    && beliefs.healthy_attacker_count() > 1
            }
            DesireKind::Capture => {
                beliefs.healthy_attacker_count() >= 2
                    && (beliefs.neutral_camp_count > 0 || beliefs.enemy_camp_count > 0)
            }
            DesireKind::Guard => true,
        }
    }

    pub fn utility(&self, beliefs: &BeliefBase) -> f32 {
        match self {
            DesireKind::Survival => SURVIVAL_UTILITY,
            DesireKind::DefendCamp => {
                let bonus = if beliefs.camp_under_attack {
                    DEFEND_THREAT_BONUS
                } else {
                    0.0
                };
                DEFEND_UTILITY + bonus
            }
            DesireKind::Scout => {
                let coverage = beliefs.unexplored_cells.len() as f32 / SCOUT_SATURATION;
                SCOUT_UTILITY * coverage.min(1.0)
            }
            DesireKind::Attack => {
                let strength = beliefs.average_team_health
                    * (beliefs.healthy_attacker_count() as f32 / ATTACK_SATURATION);
                let pressure = beliefs.enemy_hotspots.len() as f32 / ATTACK_SATURATION;
                let mut utility = ATTACK_UTILITY * (strength + pressure).min(1.0);
                if beliefs.sees_enemy_commander {
                    utility += COMMANDER_BONUS;
                }
                utility
            }
            DesireKind::Capture => {
                let camps = beliefs.neutral_camp_count as f32 * CAPTURE_PER_CAMP
                    + beliefs.enemy_camp_count as f32 * CAPTURE_PER_CAMP;
                CAPTURE_UTILITY * (1.0 + camps)
            }
            DesireKind::Guard => GUARD_UTILITY,
        }
    }

    /// Fresh plan for a new intention
    pub fn generate_plan(&self, config: &CommanderConfig) -> Box<dyn Plan> {
        match self {
            DesireKind::Survival => Box::new(RetreatPlan::new()),
            DesireKind::DefendCamp => Box::new(DefendCampPlan::new()),
            DesireKind::Scout => Box::new(ScoutingPlan::new()),
            DesireKind::Attack => Box::new(AssaultPlan::new()),
            DesireKind::Capture => Box::new(CapturePlan::new()),
            DesireKind::Guard => Box::new(GuardPlan::new(config.timing.guard_sweep_interval)),
        }
    }
}

/// The relevant desire with strictly greatest utility
///
/// Walks desires in priority order and only replaces the current pick on a
/// strictly higher utility, so ties go to the earlier desire.
pub fn select_desire(beliefs: &BeliefBase) -> Option<(DesireKind, f32)> {
    let mut best: Option<(DesireKind, f32)> = None;
    for desire in DesireKind::PRIORITY {
        if !desire.is_relevant(beliefs) {
            continue;
        }
        let utility = desire.utility(beliefs);
        tracing::trace!(desire = desire.name(), utility, "Desire scored");
        if best.map_or(true, |(_, top)| utility > top) {
            best = Some((desire, utility));
        }
    }
    best
}
