//! Entity location index
//!
//! Remembers, per vision cell, the last entity observed there. Units and
//! static entities (camps, obstacles) live in separate layers so a unit
//! standing on a camp's cell does not erase the camp. Within a layer the most
//! recent sighting owns the cell.
//!
//! Records hold generation-checked handles. Every mutating call finishes with
//! a garbage-collection pass that drops records whose entity is gone.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::blackboard::sighting::{CampSighting, UnitSighting};
use crate::core::arena::EntityRegistry;
use crate::core::types::{EntityHandle, GridCoord, Vec2};
use crate::spatial::GridLayout;
use crate::team::roster::UnitArchetype;
use crate::team::view::CampOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    AllyCamp,
    EnemyCamp,
    NeutralCamp,
    EnemyUnit,
    AllyUnit,
}

impl EntityKind {
    pub fn is_unit(&self) -> bool {
        matches!(self, EntityKind::AllyUnit | EntityKind::EnemyUnit)
    }

    pub fn is_camp(&self) -> bool {
        matches!(
            self,
            EntityKind::AllyCamp | EntityKind::EnemyCamp | EntityKind::NeutralCamp
        )
    }

    pub fn camp(owner: CampOwner) -> Self {
        match owner {
            CampOwner::Ally => EntityKind::AllyCamp,
            CampOwner::Enemy => EntityKind::EnemyCamp,
            CampOwner::Neutral => EntityKind::NeutralCamp,
        }
    }
}

/// What a sighting tells the index about one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub handle: EntityHandle,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub archetype: Option<UnitArchetype>,
}

impl Observation {
    pub fn obstacle(handle: EntityHandle, position: Vec2) -> Self {
        Self {
            handle,
            position,
            health: 0.0,
            max_health: 0.0,
            archetype: None,
        }
    }
}

impl From<&UnitSighting> for Observation {
    fn from(s: &UnitSighting) -> Self {
        Self {
            handle: s.handle,
            position: s.position,
            health: s.health,
            max_health: s.max_health,
            archetype: Some(s.archetype),
        }
    }
}

impl From<&CampSighting> for Observation {
    fn from(s: &CampSighting) -> Self {
        Self {
            handle: s.handle,
            position: s.position,
            health: s.health,
            max_health: s.max_health,
            archetype: None,
        }
    }
}

/// Last-known state of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub cell: GridCoord,
    pub kind: EntityKind,
    pub handle: EntityHandle,
    /// Currently inside some unit's perception
    pub focused: bool,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub archetype: Option<UnitArchetype>,
}

impl LocationRecord {
    fn new(cell: GridCoord, kind: EntityKind, obs: &Observation) -> Self {
        Self {
            cell,
            kind,
            handle: obs.handle,
            focused: true,
            position: obs.position,
            health: obs.health,
            max_health: obs.max_health,
            archetype: obs.archetype,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    pub fn is_commander(&self) -> bool {
        self.archetype.map_or(false, |a| a.is_commander())
    }
}

/// Result of an upsert, for callers that need to react to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// A camp the team had never recorded
    NewCamp,
    Relocated { from: GridCoord },
    Refreshed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Unit,
    Static,
}

#[derive(Debug, Clone)]
pub struct LocationIndex {
    layout: GridLayout,
    units: BTreeMap<GridCoord, LocationRecord>,
    statics: BTreeMap<GridCoord, LocationRecord>,
    by_handle: AHashMap<EntityHandle, (Layer, GridCoord)>,
}

impl LocationIndex {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            units: BTreeMap::new(),
            statics: BTreeMap::new(),
            by_handle: AHashMap::new(),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut BTreeMap<GridCoord, LocationRecord> {
        match layer {
            Layer::Unit => &mut self.units,
            Layer::Static => &mut self.statics,
        }
    }

    /// Remove whatever occupies `cell` in `layer`, keeping the handle map in sync
    fn take(&mut self, layer: Layer, cell: GridCoord) -> Option<LocationRecord> {
        let record = self.layer_mut(layer).remove(&cell)?;
        if self.by_handle.get(&record.handle) == Some(&(layer, cell)) {
            self.by_handle.remove(&record.handle);
        }
        Some(record)
    }

    fn place(&mut self, layer: Layer, record: LocationRecord) {
        let cell = record.cell;
        self.take(layer, cell);
        self.by_handle.insert(record.handle, (layer, cell));
        self.layer_mut(layer).insert(cell, record);
    }

    /// Record a sighting of `obs` as an entity of `kind`
    pub fn upsert<R: EntityRegistry + ?Sized>(
        &mut self,
        obs: &Observation,
        kind: EntityKind,
        registry: &R,
    ) -> UpsertOutcome {
        let cell = self.layout.world_to_cell(obs.position);
        let outcome = if kind.is_unit() {
            self.upsert_unit(cell, obs, kind)
        } else {
            self.upsert_static(cell, obs, kind)
        };
        self.garbage_collect(registry);
        outcome
    }

    fn upsert_unit(&mut self, cell: GridCoord, obs: &Observation, kind: EntityKind) -> UpsertOutcome {
        let previous = match self.by_handle.get(&obs.handle).copied() {
            Some((layer, old)) => self.take(layer, old),
            None => None,
        };

        match previous {
            Some(mut record) => {
                let from = record.cell;
                record.cell = cell;
                record.kind = kind;
                record.focused = true;
                record.position = obs.position;
                record.health = obs.health;
                record.max_health = obs.max_health;
                if obs.archetype.is_some() {
                    record.archetype = obs.archetype;
                }
                self.place(Layer::Unit, record);
                if from != cell {
                    UpsertOutcome::Relocated { from }
                } else {
                    UpsertOutcome::Refreshed
                }
            }
            None => {
                self.place(Layer::Unit, LocationRecord::new(cell, kind, obs));
                UpsertOutcome::Inserted
            }
        }
    }

    fn upsert_static(&mut self, cell: GridCoord, obs: &Observation, kind: EntityKind) -> UpsertOutcome {
        if let Some(&(layer, old)) = self.by_handle.get(&obs.handle) {
            if (layer, old) != (Layer::Static, cell) {
                self.take(layer, old);
            }
        }

        match self.statics.get_mut(&cell) {
            Some(existing) => {
                if existing.handle != obs.handle {
                    self.by_handle.remove(&existing.handle);
                    existing.handle = obs.handle;
                    self.by_handle.insert(obs.handle, (Layer::Static, cell));
                }
                existing.kind = kind;
                existing.focused = true;
                existing.position = obs.position;
                if kind != EntityKind::Obstacle {
                    existing.health = obs.health;
                    existing.max_health = obs.max_health;
                }
                UpsertOutcome::Refreshed
            }
            None => {
                self.place(Layer::Static, LocationRecord::new(cell, kind, obs));
                if kind.is_camp() {
                    UpsertOutcome::NewCamp
                } else {
                    UpsertOutcome::Inserted
                }
            }
        }
    }

    /// The entity left perception; keep its last-known record
    pub fn mark_unfocused<R: EntityRegistry + ?Sized>(&mut self, handle: EntityHandle, registry: &R) {
        if let Some(&(layer, cell)) = self.by_handle.get(&handle) {
            if let Some(record) = self.layer_mut(layer).get_mut(&cell) {
                record.focused = false;
            }
        }
        self.garbage_collect(registry);
    }

    /// Vision just re-observed `cell`: a stale enemy recorded there is gone
    ///
    /// Returns true when a record was evicted.
    pub fn reconcile_seen_cell<R: EntityRegistry + ?Sized>(
        &mut self,
        cell: GridCoord,
        registry: &R,
    ) -> bool {
        let stale = self
            .units
            .get(&cell)
            .map_or(false, |r| r.kind == EntityKind::EnemyUnit && !r.focused);
        if stale {
            self.take(Layer::Unit, cell);
        }
        self.garbage_collect(registry);
        stale
    }

    /// Clear the record of an ally unit that died at `position`
    pub fn remove_dead_ally<R: EntityRegistry + ?Sized>(
        &mut self,
        handle: EntityHandle,
        position: Vec2,
        registry: &R,
    ) {
        let cell = self.layout.world_to_cell(position);
        if self
            .units
            .get(&cell)
            .map_or(false, |r| r.kind == EntityKind::AllyUnit)
        {
            self.take(Layer::Unit, cell);
        }
        if let Some(&(Layer::Unit, other)) = self.by_handle.get(&handle) {
            if self.units.get(&other).map_or(false, |r| r.kind == EntityKind::AllyUnit) {
                self.take(Layer::Unit, other);
            }
        }
        self.garbage_collect(registry);
    }

    /// Drop every record whose entity is no longer alive; returns how many were dropped
    pub fn garbage_collect<R: EntityRegistry + ?Sized>(&mut self, registry: &R) -> usize {
        let before = self.len();
        self.units.retain(|_, r| registry.is_alive(r.handle));
        self.statics.retain(|_, r| registry.is_alive(r.handle));
        let removed = before - self.len();
        if removed > 0 {
            let units = &self.units;
            let statics = &self.statics;
            self.by_handle.retain(|_, entry| match entry.0 {
                Layer::Unit => units.contains_key(&entry.1),
                Layer::Static => statics.contains_key(&entry.1),
            });
        }
        removed
    }

    /// Point lookup; a unit standing on a camp shadows the camp
    pub fn get(&self, cell: GridCoord) -> Option<&LocationRecord> {
        self.units.get(&cell).or_else(|| self.statics.get(&cell))
    }

    pub fn find(&self, handle: EntityHandle) -> Option<&LocationRecord> {
        let (layer, cell) = self.by_handle.get(&handle)?;
        match layer {
            Layer::Unit => self.units.get(cell),
            Layer::Static => self.statics.get(cell),
        }
    }

    pub fn is_occupied(&self, cell: GridCoord) -> bool {
        self.units.contains_key(&cell) || self.statics.contains_key(&cell)
    }

    pub fn units(&self) -> impl Iterator<Item = &LocationRecord> {
        self.units.values()
    }

    pub fn enemy_units(&self) -> impl Iterator<Item = &LocationRecord> {
        self.units.values().filter(|r| r.kind == EntityKind::EnemyUnit)
    }

    pub fn statics_of(&self, kind: EntityKind) -> impl Iterator<Item = &LocationRecord> {
        self.statics.values().filter(move |r| r.kind == kind)
    }

    pub fn ally_camps(&self) -> impl Iterator<Item = &LocationRecord> {
        self.statics_of(EntityKind::AllyCamp)
    }

    pub fn enemy_camps(&self) -> impl Iterator<Item = &LocationRecord> {
        self.statics_of(EntityKind::EnemyCamp)
    }

    pub fn neutral_camps(&self) -> impl Iterator<Item = &LocationRecord> {
        self.statics_of(EntityKind::NeutralCamp)
    }

    /// Enemy unit records strictly closer than `radius` world units to `center`
    pub fn enemies_within(&self, center: Vec2, radius: f32) -> impl Iterator<Item = &LocationRecord> {
        self.enemy_units()
            .filter(move |r| r.position.distance(center) < radius)
    }

    /// Static records of `kind` strictly closer than `radius` world units to `center`
    pub fn statics_within(
        &self,
        kind: EntityKind,
        center: Vec2,
        radius: f32,
    ) -> impl Iterator<Item = &LocationRecord> {
        self.statics_of(kind)
            .filter(move |r| r.position.distance(center) < radius)
    }

    pub fn len(&self) -> usize {
        self.units.len() + self.statics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
