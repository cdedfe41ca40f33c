//! Sighting batches handed to the blackboard once per tick
//!
//! Perception collaborators queue what they noticed during the frame; the
//! blackboard applies the whole batch in a fixed order (vision, terrain,
//! location, influence) so nothing depends on callback order.

use serde::{Deserialize, Serialize};

use crate::blackboard::events::TacticalEvent;
use crate::blackboard::terrain::TerrainKind;
use crate::core::types::{EntityHandle, GridCoord, Vec2};
use crate::team::roster::UnitArchetype;
use crate::team::view::CampOwner;

/// Observed state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSighting {
    pub handle: EntityHandle,
    pub archetype: UnitArchetype,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
}

/// Observed state of a camp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampSighting {
    pub handle: EntityHandle,
    pub owner: CampOwner,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SightingEvent {
    /// A vision cell is inside some unit's view this tick
    CellSeen(GridCoord),
    Terrain { cell: GridCoord, kind: TerrainKind },
    AllyMoved(UnitSighting),
    AllyDestroyed { handle: EntityHandle, position: Vec2 },
    EnemyDetected(UnitSighting),
    EnemyLost(EntityHandle),
    CampDetected(CampSighting),
    CampLost(EntityHandle),
    /// A camp changed hands; the sighting carries the new owner
    CampCaptured(CampSighting),
    ObstacleDetected { handle: EntityHandle, position: Vec2 },
    ObstacleLost(EntityHandle),
    Tactical(TacticalEvent),
}

/// Everything perception reported during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SightingBatch {
    events: Vec<SightingEvent>,
}

impl SightingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SightingEvent) {
        self.events.push(event);
    }

    pub fn with(mut self, event: SightingEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn see_cells(&mut self, cells: impl IntoIterator<Item = GridCoord>) {
        self.events.extend(cells.into_iter().map(SightingEvent::CellSeen));
    }

    pub fn events(&self) -> &[SightingEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn seen_cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.events.iter().filter_map(|e| match e {
            SightingEvent::CellSeen(cell) => Some(*cell),
            _ => None,
        })
    }
}

impl FromIterator<SightingEvent> for SightingBatch {
    fn from_iter<I: IntoIterator<Item = SightingEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<SightingEvent> for SightingBatch {
    fn extend<I: IntoIterator<Item = SightingEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
