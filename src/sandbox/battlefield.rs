//! Sandbox battlefield simulation
//!
//! Units, camps and obstacles share one generational arena, so every handle
//! is unique across kinds. `step` advances movement, turning, fire and
//! reloads, then resolves damage, deaths and camp captures. Whatever a team
//! should hear about is queued per team and handed out with its next
//! sighting batch.

use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

use ahash::{AHashMap, AHashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::blackboard::{CampSighting, SightingEvent, TacticalEvent, TacticalEventKind, TerrainKind};
use crate::core::arena::Arena;
use crate::core::config::MapConfig;
use crate::core::types::{EntityHandle, GridCoord, TeamId, Vec2};
use crate::sandbox::entity::{
    SandboxCamp, SandboxEntity, SandboxUnit, ARRIVAL_RADIUS, MEDIC_HEAL_RATE, MEDIC_REACH,
};
use crate::spatial::GridLayout;
use crate::team::orders::{Order, OrderType};
use crate::team::roster::{MotionState, UnitArchetype};
use crate::team::view::CampOwner;

/// Health a camp keeps when it changes hands, as a fraction of max
const CAPTURED_CAMP_HEALTH: f32 = 0.5;
/// Damage roll spread around the archetype's nominal damage
const DAMAGE_SPREAD: f32 = 0.2;

#[derive(Debug, Clone, Copy)]
struct Hit {
    target: EntityHandle,
    amount: f32,
    team: TeamId,
}

#[derive(Debug, Clone)]
pub struct Battlefield {
    pub(crate) layout: GridLayout,
    pub(crate) entities: Arena<SandboxEntity>,
    pub(crate) terrain: AHashMap<GridCoord, TerrainKind>,
    pub(crate) visible: AHashMap<TeamId, AHashSet<EntityHandle>>,
    pub(crate) terrain_reported: AHashMap<TeamId, AHashSet<GridCoord>>,
    pub(crate) pending: AHashMap<TeamId, Vec<SightingEvent>>,
    teams: BTreeSet<TeamId>,
    rng: ChaCha8Rng,
    clock: f32,
}

/// Camp ownership as seen by `viewer`
pub fn relative_owner(owner: Option<TeamId>, viewer: TeamId) -> CampOwner {
    match owner {
        None => CampOwner::Neutral,
        Some(team) if team == viewer => CampOwner::Ally,
        Some(_) => CampOwner::Enemy,
    }
}

pub(crate) fn camp_sighting(handle: EntityHandle, camp: &SandboxCamp, viewer: TeamId) -> CampSighting {
    CampSighting {
        handle,
        owner: relative_owner(camp.owner, viewer),
        position: camp.position,
        health: camp.health,
        max_health: camp.max_health,
    }
}

/// Wrap an angle into [-PI, PI)
pub(crate) fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

impl Battlefield {
    pub fn new(map: MapConfig, seed: u64) -> Self {
        Self {
            layout: GridLayout::cells(&map),
            entities: Arena::new(),
            terrain: AHashMap::new(),
            visible: AHashMap::new(),
            terrain_reported: AHashMap::new(),
            pending: AHashMap::new(),
            teams: BTreeSet::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: 0.0,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn entities(&self) -> &Arena<SandboxEntity> {
        &self.entities
    }

    /// Simulated seconds since creation
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn spawn_unit(&mut self, team: TeamId, archetype: UnitArchetype, position: Vec2) -> EntityHandle {
        self.teams.insert(team);
        self.entities
            .insert(SandboxEntity::Unit(SandboxUnit::new(team, archetype, position)))
    }

    /// Spawn a camp at full health; `None` makes it neutral
    pub fn spawn_camp(&mut self, owner: Option<TeamId>, position: Vec2, max_health: f32) -> EntityHandle {
        if let Some(team) = owner {
            self.teams.insert(team);
        }
        self.entities.insert(SandboxEntity::Camp(SandboxCamp {
            owner,
            position,
            health: max_health,
            max_health,
            last_attacker: None,
        }))
    }

    pub fn spawn_obstacle(&mut self, position: Vec2) -> EntityHandle {
        self.entities.insert(SandboxEntity::Obstacle { position })
    }

    pub fn set_terrain(&mut self, cell: GridCoord, kind: TerrainKind) {
        self.terrain.insert(cell, kind);
    }

    pub fn set_water(&mut self, cell: GridCoord) {
        self.set_terrain(cell, TerrainKind::Water);
    }

    /// Open ground unless painted otherwise
    pub fn terrain_at(&self, cell: GridCoord) -> TerrainKind {
        self.terrain.get(&cell).copied().unwrap_or(TerrainKind::Granite)
    }

    /// Overwrite a unit's or camp's current health
    pub fn set_health(&mut self, handle: EntityHandle, health: f32) {
        match self.entities.get_mut(handle) {
            Some(SandboxEntity::Unit(unit)) => unit.health = health.min(unit.max_health),
            Some(SandboxEntity::Camp(camp)) => camp.health = health.min(camp.max_health),
            _ => {}
        }
    }

    pub fn set_motion(&mut self, handle: EntityHandle, motion: MotionState) {
        if let Some(unit) = self.unit_mut(handle) {
            unit.motion = motion;
        }
    }

    pub fn set_attack_target(&mut self, handle: EntityHandle, target: Option<EntityHandle>) {
        if let Some(unit) = self.unit_mut(handle) {
            unit.attack_target = target;
        }
    }

    pub fn set_vision_range(&mut self, handle: EntityHandle, range: f32) {
        if let Some(unit) = self.unit_mut(handle) {
            unit.vision_range = range;
        }
    }

    pub fn set_facing(&mut self, handle: EntityHandle, facing: f32) {
        if let Some(unit) = self.unit_mut(handle) {
            unit.facing = wrap_angle(facing);
        }
    }

    /// Remove a unit as if it had been destroyed
    pub fn kill(&mut self, handle: EntityHandle) {
        self.destroy_unit(handle);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn unit(&self, handle: EntityHandle) -> Option<&SandboxUnit> {
        self.entities.get(handle).and_then(SandboxEntity::as_unit)
    }

    fn unit_mut(&mut self, handle: EntityHandle) -> Option<&mut SandboxUnit> {
        self.entities.get_mut(handle).and_then(SandboxEntity::as_unit_mut)
    }

    pub fn camp(&self, handle: EntityHandle) -> Option<&SandboxCamp> {
        self.entities.get(handle).and_then(SandboxEntity::as_camp)
    }

    pub fn units_of(&self, team: TeamId) -> impl Iterator<Item = (EntityHandle, &SandboxUnit)> {
        self.entities
            .iter()
            .filter_map(move |(handle, entity)| match entity {
                SandboxEntity::Unit(unit) if unit.team == team => Some((handle, unit)),
                _ => None,
            })
    }

    pub fn camps(&self) -> impl Iterator<Item = (EntityHandle, &SandboxCamp)> {
        self.entities
            .iter()
            .filter_map(|(handle, entity)| entity.as_camp().map(|camp| (handle, camp)))
    }

    pub fn camps_owned_by(&self, team: TeamId) -> usize {
        self.camps().filter(|(_, camp)| camp.owner == Some(team)).count()
    }

    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.teams.iter().copied()
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Hand a team's orders to its units; orders for other teams' or dead units are ignored
    pub fn apply_orders(&mut self, team: TeamId, orders: &[Order]) {
        for order in orders {
            let Some(unit) = self.unit_mut(order.unit) else {
                tracing::trace!(unit = ?order.unit, "Order for missing unit dropped");
                continue;
            };
            if unit.team != team {
                continue;
            }

            match order.order_type {
                OrderType::MoveTo(destination) => {
                    unit.destination = Some(destination);
                    unit.attack_target = None;
                    unit.motion = MotionState::Moving;
                }
                OrderType::Attack(target) => {
                    if unit.stats().is_armed() {
                        unit.attack_target = Some(target);
                        unit.destination = None;
                        unit.motion = MotionState::Attacking;
                    }
                }
                OrderType::Stop => {
                    unit.destination = None;
                    unit.attack_target = None;
                    unit.pending_turn = 0.0;
                    unit.motion = MotionState::Idle;
                }
                OrderType::Rotate(angle) => {
                    unit.pending_turn = angle;
                    unit.motion = MotionState::Rotating;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    fn notify(&mut self, team: TeamId, event: SightingEvent) {
        self.pending.entry(team).or_default().push(event);
    }

    fn notify_tactical(&mut self, team: TeamId, kind: TacticalEventKind, subject: EntityHandle, position: Vec2) {
        self.notify(
            team,
            SightingEvent::Tactical(TacticalEvent::new(kind, subject, position, true)),
        );
    }

    /// Advance the world by `delta` seconds
    pub fn step(&mut self, delta: f32) {
        self.clock += delta;

        let handles: Vec<EntityHandle> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.as_unit().is_some())
            .map(|(handle, _)| handle)
            .collect();

        let mut hits = Vec::new();
        let mut heals = Vec::new();
        for handle in handles {
            self.tick_weapon(handle, delta);
            self.tick_motion(handle, delta, &mut hits);
            self.tick_medic(handle, delta, &mut heals);
        }

        for (target, amount) in heals {
            self.apply_heal(target, amount);
        }
        for hit in hits {
            self.apply_hit(hit);
        }
    }

    fn tick_weapon(&mut self, handle: EntityHandle, delta: f32) {
        let Some(unit) = self.unit_mut(handle) else {
            return;
        };
        unit.fire_cooldown = (unit.fire_cooldown - delta).max(0.0);

        let Some(left) = unit.reloading else {
            return;
        };
        if left - delta > 0.0 {
            unit.reloading = Some(left - delta);
            return;
        }
        unit.reloading = None;
        unit.ammo = unit.stats().magazine;
        let (team, position) = (unit.team, unit.position);
        self.notify_tactical(team, TacticalEventKind::ReloadCompleted, handle, position);
    }

    fn tick_motion(&mut self, handle: EntityHandle, delta: f32, hits: &mut Vec<Hit>) {
        let Some((motion, destination)) = self.unit(handle).map(|u| (u.motion, u.destination)) else {
            return;
        };
        match motion {
            MotionState::Idle | MotionState::Dead => {}
            MotionState::Rotating => self.tick_turn(handle, delta),
            MotionState::Moving => {
                match destination {
                    Some(goal) => {
                        if self.advance_towards(handle, goal, ARRIVAL_RADIUS, delta) {
                            if let Some(unit) = self.unit_mut(handle) {
                                unit.destination = None;
                                unit.motion = MotionState::Idle;
                            }
                        }
                    }
                    None => self.set_motion(handle, MotionState::Idle),
                }
            }
            MotionState::Attacking => self.tick_attack(handle, delta, hits),
        }
    }

    fn tick_turn(&mut self, handle: EntityHandle, delta: f32) {
        let Some(unit) = self.unit_mut(handle) else {
            return;
        };
        let max_step = unit.stats().turn_rate * delta;
        let step = unit.pending_turn.clamp(-max_step, max_step);
        unit.facing = wrap_angle(unit.facing + step);
        unit.pending_turn -= step;
        if unit.pending_turn.abs() <= f32::EPSILON {
            unit.pending_turn = 0.0;
            unit.motion = MotionState::Idle;
        }
    }

    /// Move toward `goal`; true once within `stop_within`
    ///
    /// Terrain slows movement; a step into impassable terrain ends the move.
    fn advance_towards(&mut self, handle: EntityHandle, goal: Vec2, stop_within: f32, delta: f32) -> bool {
        let layout = self.layout;
        let Some(unit) = self.unit(handle) else {
            return true;
        };
        let offset = goal - unit.position;
        let distance = offset.length();
        if distance <= stop_within {
            return true;
        }

        let cost = self
            .terrain_at(layout.world_to_cell(unit.position))
            .movement_cost()
            .unwrap_or(1.0);
        let travel = (unit.stats().speed * delta / cost).min(distance);
        let next = unit.position + offset / distance * travel;
        let passable = self
            .terrain_at(layout.world_to_cell(next))
            .is_passable();

        let Some(unit) = self.unit_mut(handle) else {
            return true;
        };
        unit.facing = offset.y.atan2(offset.x);
        if !passable {
            return true;
        }
        unit.position = next;
        distance - travel <= stop_within
    }

    fn tick_attack(&mut self, handle: EntityHandle, delta: f32, hits: &mut Vec<Hit>) {
        let Some(unit) = self.unit(handle) else {
            return;
        };
        let stats = unit.stats();
        let team = unit.team;
        let target_position = unit
            .attack_target
            .and_then(|target| self.entities.get(target))
            .filter(|entity| match entity {
                SandboxEntity::Unit(other) => other.team != team,
                SandboxEntity::Camp(camp) => camp.owner != Some(team),
                SandboxEntity::Obstacle { .. } => false,
            })
            .map(SandboxEntity::position);

        let Some(target_position) = target_position else {
            if let Some(unit) = self.unit_mut(handle) {
                unit.attack_target = None;
                unit.motion = MotionState::Idle;
            }
            return;
        };

        if unit.position.distance(target_position) > stats.attack_range {
            self.advance_towards(handle, target_position, stats.attack_range, delta);
            return;
        }

        let roll = 1.0 + self.rng.gen_range(-DAMAGE_SPREAD..=DAMAGE_SPREAD);
        let Some(unit) = self.unit_mut(handle) else {
            return;
        };
        let offset = target_position - unit.position;
        if offset.length_squared() > 0.0 {
            unit.facing = offset.y.atan2(offset.x);
        }
        if unit.reloading.is_some() || unit.fire_cooldown > 0.0 || unit.ammo == 0 {
            return;
        }
        let Some(target) = unit.attack_target else {
            return;
        };

        unit.ammo -= 1;
        unit.fire_cooldown = stats.fire_interval;
        let empty = unit.ammo == 0;
        if empty {
            unit.reloading = Some(stats.reload_time);
        }
        let (team, position) = (unit.team, unit.position);

        hits.push(Hit {
            target,
            amount: stats.damage * roll,
            team,
        });
        self.notify_tactical(
            team,
            TacticalEventKind::WeaponFired {
                target: Some(target),
            },
            handle,
            position,
        );
        if empty {
            self.notify_tactical(team, TacticalEventKind::WeaponEmpty, handle, position);
            self.notify_tactical(team, TacticalEventKind::ReloadStarted, handle, position);
        }
    }

    fn tick_medic(&mut self, handle: EntityHandle, delta: f32, heals: &mut Vec<(EntityHandle, f32)>) {
        let Some(medic) = self.unit(handle) else {
            return;
        };
        if medic.archetype != UnitArchetype::Medic || medic.motion != MotionState::Idle {
            return;
        }
        let (team, position) = (medic.team, medic.position);
        let patient = self
            .units_of(team)
            .filter(|(other, unit)| {
                *other != handle
                    && unit.health < unit.max_health
                    && unit.position.distance(position) <= MEDIC_REACH
            })
            .map(|(other, _)| other)
            .next();
        if let Some(patient) = patient {
            heals.push((patient, MEDIC_HEAL_RATE * delta));
        }
    }

    fn apply_heal(&mut self, target: EntityHandle, amount: f32) {
        let Some(unit) = self.unit_mut(target) else {
            return;
        };
        let healed = amount.min(unit.max_health - unit.health);
        if healed <= 0.0 {
            return;
        }
        unit.health += healed;
        let (team, position) = (unit.team, unit.position);
        self.notify_tactical(team, TacticalEventKind::Healed { amount: healed }, target, position);
    }

    fn apply_hit(&mut self, hit: Hit) {
        match self.entities.get_mut(hit.target) {
            Some(SandboxEntity::Unit(unit)) => {
                unit.health -= hit.amount;
                let (team, position, dead) = (unit.team, unit.position, unit.health <= 0.0);
                self.notify_tactical(
                    team,
                    TacticalEventKind::Damaged { amount: hit.amount },
                    hit.target,
                    position,
                );
                if dead {
                    self.destroy_unit(hit.target);
                }
            }
            Some(SandboxEntity::Camp(camp)) => {
                if camp.owner == Some(hit.team) {
                    return;
                }
                camp.health -= hit.amount;
                camp.last_attacker = Some(hit.team);
                if camp.health <= 0.0 {
                    self.capture_camp(hit.target, hit.team);
                }
            }
            _ => {}
        }
    }

    fn destroy_unit(&mut self, handle: EntityHandle) {
        let Some(SandboxEntity::Unit(unit)) = self.entities.remove(handle) else {
            return;
        };
        tracing::debug!(unit = ?handle, archetype = ?unit.archetype, "Unit destroyed");
        self.notify(
            unit.team,
            SightingEvent::AllyDestroyed {
                handle,
                position: unit.position,
            },
        );
    }

    fn capture_camp(&mut self, handle: EntityHandle, team: TeamId) {
        let Some(camp) = self.entities.get_mut(handle).and_then(SandboxEntity::as_camp_mut) else {
            return;
        };
        let previous = camp.owner;
        camp.owner = Some(team);
        camp.health = camp.max_health * CAPTURED_CAMP_HEALTH;
        let snapshot = camp.clone();
        tracing::info!(camp = ?handle, ?previous, new_owner = team.0, "Camp captured");

        self.notify(team, SightingEvent::CampCaptured(camp_sighting(handle, &snapshot, team)));
        if let Some(loser) = previous {
            self.notify(loser, SightingEvent::CampCaptured(camp_sighting(handle, &snapshot, loser)));
        }
    }
}
