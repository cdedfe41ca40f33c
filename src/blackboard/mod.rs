//! Team blackboard: everything the team knows about the battlefield
//!
//! Owns the vision, terrain, location and influence fields plus the tactical
//! event log. Perception hands over one `SightingBatch` per tick and the
//! blackboard applies it in a fixed order:
//!
//! 1. vision (mark seen cells)
//! 2. terrain (first observation per cell)
//! 3. location (entity events in arrival order, then stale-enemy reconciliation)
//! 4. influence (full rebuild, then confidence)

pub mod events;
pub mod influence;
pub mod location;
pub mod sighting;
pub mod terrain;
pub mod vision;

pub use events::{TacticalEvent, TacticalEventKind, TacticalEventLog};
pub use influence::{InfluenceCell, InfluenceField};
pub use location::{EntityKind, LocationIndex, LocationRecord, Observation, UpsertOutcome};
pub use sighting::{CampSighting, SightingBatch, SightingEvent, UnitSighting};
pub use terrain::{TerrainField, TerrainKind};
pub use vision::{VisionField, NEVER_SEEN};

use serde::{Deserialize, Serialize};

use crate::core::arena::EntityRegistry;
use crate::core::config::CommanderConfig;
use crate::core::types::{EntityHandle, GridCoord, Vec2};
use crate::spatial::GridLayout;
use crate::team::view::CampOwner;

/// A camp the team recorded for the first time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewCamp {
    pub handle: EntityHandle,
    pub kind: EntityKind,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct Blackboard {
    vision: VisionField,
    terrain: TerrainField,
    location: LocationIndex,
    influence: InfluenceField,
    events: TacticalEventLog,
    new_camps: Vec<NewCamp>,
}

impl Blackboard {
    pub fn new(config: &CommanderConfig) -> Self {
        let cells = GridLayout::cells(&config.map);
        Self {
            vision: VisionField::new(cells),
            terrain: TerrainField::new(cells),
            location: LocationIndex::new(cells),
            influence: InfluenceField::new(&config.map, &config.influence),
            events: TacticalEventLog::new(config.timing.event_ttl),
            new_camps: Vec::new(),
        }
    }

    pub fn vision(&self) -> &VisionField {
        &self.vision
    }

    pub fn terrain(&self) -> &TerrainField {
        &self.terrain
    }

    pub fn location(&self) -> &LocationIndex {
        &self.location
    }

    pub fn influence(&self) -> &InfluenceField {
        &self.influence
    }

    pub fn events(&self) -> &TacticalEventLog {
        &self.events
    }

    /// Advance time-based state: vision ages and old events expire
    pub fn age(&mut self, delta: f32) {
        self.vision.age(delta);
        self.events.advance(delta);
    }

    /// Apply one tick's sightings
    pub fn ingest<R: EntityRegistry + ?Sized>(&mut self, batch: SightingBatch, registry: &R) {
        let mut seen: Vec<GridCoord> = Vec::new();
        for cell in batch.seen_cells() {
            if self.vision.mark_seen(cell) {
                seen.push(cell);
            }
        }

        for event in batch.events() {
            if let SightingEvent::Terrain { cell, kind } = event {
                self.terrain.observe(*cell, *kind);
            }
        }

        self.location.garbage_collect(registry);
        for event in batch.events() {
            self.apply_location_event(event, registry);
        }

        let mut evicted = 0;
        for cell in &seen {
            if self.location.reconcile_seen_cell(*cell, registry) {
                evicted += 1;
            }
        }

        self.influence.rebuild(&self.location);
        self.influence.refresh_confidence(&self.vision);

        tracing::debug!(
            events = batch.len(),
            cells_seen = seen.len(),
            evicted,
            tracked = self.location.len(),
            "Blackboard ingested sightings"
        );
    }

    fn apply_location_event<R: EntityRegistry + ?Sized>(
        &mut self,
        event: &SightingEvent,
        registry: &R,
    ) {
        match event {
            SightingEvent::CellSeen(_) | SightingEvent::Terrain { .. } => {}
            SightingEvent::AllyMoved(unit) => {
                self.location
                    .upsert(&Observation::from(unit), EntityKind::AllyUnit, registry);
            }
            SightingEvent::AllyDestroyed { handle, position } => {
                self.location.remove_dead_ally(*handle, *position, registry);
                self.events.record(TacticalEvent::new(
                    TacticalEventKind::Destroyed,
                    *handle,
                    *position,
                    true,
                ));
            }
            SightingEvent::EnemyDetected(unit) => {
                self.location
                    .upsert(&Observation::from(unit), EntityKind::EnemyUnit, registry);
            }
            SightingEvent::CampDetected(camp) => {
                self.upsert_camp(camp, registry);
            }
            SightingEvent::CampCaptured(camp) => {
                self.upsert_camp(camp, registry);
                self.events.record(TacticalEvent::new(
                    TacticalEventKind::TargetCaptured { camp: camp.handle },
                    camp.handle,
                    camp.position,
                    camp.owner == CampOwner::Ally,
                ));
            }
            SightingEvent::ObstacleDetected { handle, position } => {
                self.location.upsert(
                    &Observation::obstacle(*handle, *position),
                    EntityKind::Obstacle,
                    registry,
                );
            }
            SightingEvent::EnemyLost(handle)
            | SightingEvent::CampLost(handle)
            | SightingEvent::ObstacleLost(handle) => {
                self.location.mark_unfocused(*handle, registry);
            }
            SightingEvent::Tactical(tactical) => {
                self.events.record(*tactical);
            }
        }
    }

    fn upsert_camp<R: EntityRegistry + ?Sized>(&mut self, camp: &CampSighting, registry: &R) {
        let kind = EntityKind::camp(camp.owner);
        let outcome = self.location.upsert(&Observation::from(camp), kind, registry);
        if outcome == UpsertOutcome::NewCamp {
            tracing::info!(camp = ?camp.handle, ?kind, "New camp spotted");
            self.new_camps.push(NewCamp {
                handle: camp.handle,
                kind,
                position: camp.position,
            });
        }
    }

    /// Drain camps recorded for the first time since the last call
    pub fn take_new_camps(&mut self) -> Vec<NewCamp> {
        std::mem::take(&mut self.new_camps)
    }
}
