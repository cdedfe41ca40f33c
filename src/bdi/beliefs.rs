//! Belief base: derived facts recomputed every tick
//!
//! Nothing here is remembered between ticks except through the blackboard;
//! each refresh overwrites the previous snapshot.

use ordered_float::OrderedFloat;

use crate::blackboard::Blackboard;
use crate::core::config::BeliefConfig;
use crate::core::types::{GridCoord, Vec2};
use crate::team::roster::UnitSnapshot;
use crate::team::view::WorldView;

#[derive(Debug, Clone, Default)]
pub struct BeliefBase {
    /// Live units of the team this tick
    pub units: Vec<UnitSnapshot>,
    pub friendly_unit_count: usize,
    /// Total current health over total max health (0 with no units)
    pub average_team_health: f32,
    pub low_health_units_present: bool,
    pub healthy_attackers: Vec<UnitSnapshot>,
    pub healthy_scouts: Vec<UnitSnapshot>,

    /// Confident influence regions dominated by the enemy
    pub enemy_hotspots: Vec<GridCoord>,
    pub march_opportunity: bool,
    /// Influence region to march on
    pub best_attack_target: Option<GridCoord>,
    pub sees_enemy_commander: bool,
    pub enemy_commander_position: Option<Vec2>,
    /// Vision cells worth scouting, best first
    pub unexplored_cells: Vec<GridCoord>,
    pub scouting_needed: bool,
    pub best_scout_target: Option<GridCoord>,
    pub camp_under_attack: bool,

    /// Vision cell of the main ally camp
    pub team_base: Option<GridCoord>,
    pub team_base_position: Option<Vec2>,
    pub ally_camp_count: usize,
    pub enemy_camp_count: usize,
    pub neutral_camp_count: usize,
    /// Friendly units destroyed within the event log window
    pub recent_losses: usize,
}

impl BeliefBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every belief from the roster and the blackboard
    ///
    /// Resource beliefs run before strategic ones so that the base-threat
    /// check sees this tick's base.
    pub fn refresh(&mut self, world: &dyn WorldView, board: &Blackboard, config: &BeliefConfig) {
        self.update_unit_beliefs(world, config);
        self.update_resource_beliefs(board);
        self.update_strategic_beliefs(world, board, config);
    }

    fn update_unit_beliefs(&mut self, world: &dyn WorldView, config: &BeliefConfig) {
        self.units = world
            .team_units()
            .into_iter()
            .filter(|u| u.is_alive())
            .collect();
        self.friendly_unit_count = self.units.len();

        let (health, max_health) = self
            .units
            .iter()
            .fold((0.0, 0.0), |(h, m), u| (h + u.health, m + u.max_health));
        self.average_team_health = if self.units.is_empty() || max_health <= 0.0 {
            0.0
        } else {
            health / max_health
        };

        self.low_health_units_present = self
            .units
            .iter()
            .any(|u| u.health < u.max_health * config.low_health_fraction);

        self.healthy_attackers = self
            .units
            .iter()
            .filter(|u| {
                u.archetype.can_attack()
                    && u.health > u.max_health * config.attacker_health_fraction
                    && !u.weapon_reloading
            })
            .cloned()
            .collect();

        self.healthy_scouts = self
            .units
            .iter()
            .filter(|u| u.archetype.is_scout() && u.health > u.max_health * config.scout_health_fraction)
            .cloned()
            .collect();
    }

    fn update_resource_beliefs(&mut self, board: &Blackboard) {
        let location = board.location();

        let mut base: Option<(GridCoord, Vec2, f32)> = None;
        for camp in location.ally_camps() {
            if base.map_or(true, |(_, _, best)| camp.max_health > best) {
                base = Some((camp.cell, camp.position, camp.max_health));
            }
        }
        self.team_base = base.map(|(cell, _, _)| cell);
        self.team_base_position = base.map(|(_, pos, _)| pos);

        self.ally_camp_count = location.ally_camps().count();
        self.enemy_camp_count = location.enemy_camps().count();
        self.neutral_camp_count = location.neutral_camps().count();
        self.recent_losses = board.events().friendly_losses();
    }

    fn update_strategic_beliefs(
        &mut self,
        world: &dyn WorldView,
        board: &Blackboard,
        config: &BeliefConfig,
    ) {
        let location = board.location();
        let influence = board.influence();

        self.enemy_hotspots = influence
            .iter()
            .filter(|(_, cell)| cell.confident && cell.total() < 0.0)
            .map(|(region, _)| region)
            .collect();
        self.march_opportunity = !self.enemy_hotspots.is_empty();

        let commander = location
            .enemy_units()
            .find(|r| r.focused && r.is_commander());
        self.sees_enemy_commander = commander.is_some();
        self.enemy_commander_position = commander.map(|r| r.position);

        // Weakest spot for us is the most hostile one
        self.best_attack_target = match commander {
            Some(record) => Some(influence.region_of(record.cell)),
            None => self
                .enemy_hotspots
                .iter()
                .copied()
                .min_by_key(|region| {
                    OrderedFloat(influence.get(*region).map_or(0.0, |c| c.total()))
                }),
        };

        self.unexplored_cells = self.find_unexplored_cells(world, board, config);
        self.scouting_needed = !self.unexplored_cells.is_empty();
        self.best_scout_target = self
            .unexplored_cells
            .iter()
            .copied()
            .find(|cell| !cell.neighbourhood().any(|n| location.is_occupied(n)))
            .or_else(|| self.unexplored_cells.first().copied());

        self.camp_under_attack = match self.team_base {
            Some(base) => location
                .enemy_units()
                .any(|r| r.cell.distance(&base) < config.camp_threat_radius),
            None => false,
        };
    }

    /// Stale or never-seen walkable cells in a band around the scouts
    ///
    /// Ranked by descending age, then ascending distance to the scouts.
    fn find_unexplored_cells(
        &self,
        world: &dyn WorldView,
        board: &Blackboard,
        config: &BeliefConfig,
    ) -> Vec<GridCoord> {
        let vision = board.vision();
        let layout = vision.layout();

        let anchor = if self.healthy_scouts.is_empty() {
            GridCoord::ZERO
        } else {
            let sum: Vec2 = self.healthy_scouts.iter().map(|s| s.position).sum();
            layout.world_to_cell(sum / self.healthy_scouts.len() as f32)
        };

        let mut candidates: Vec<(GridCoord, f32, f32)> = vision
            .iter()
            .filter(|(_, age)| *age > config.unexplored_age)
            .filter_map(|(cell, age)| {
                let distance = cell.distance(&anchor);
                (distance > config.scout_band_min && distance < config.scout_band_max)
                    .then_some((cell, age, distance))
            })
            .filter(|(cell, _, _)| world.is_walkable(*cell))
            .collect();

        candidates.sort_by_key(|(_, age, distance)| {
            (std::cmp::Reverse(OrderedFloat(*age)), OrderedFloat(*distance))
        });
        candidates.into_iter().map(|(cell, _, _)| cell).collect()
    }

    pub fn healthy_attacker_count(&self) -> usize {
        self.healthy_attackers.len()
    }

    pub fn healthy_scout_count(&self) -> usize {
        self.healthy_scouts.len()
    }
}
