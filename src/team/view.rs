//! What the commander can ask of the host game each tick

use serde::{Deserialize, Serialize};

use crate::core::arena::EntityRegistry;
use crate::core::types::{EntityHandle, GridCoord, Vec2};
use crate::team::roster::{UnitArchetype, UnitSnapshot};

/// Camp ownership relative to the observing team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampOwner {
    Ally,
    Enemy,
    Neutral,
}

/// Perception query shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// Narrow forward field of view
    Cone,
    /// Wide all-round awareness circle
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerceivedKind {
    EnemyUnit(UnitArchetype),
    Camp(CampOwner),
}

/// An entity currently visible to one unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceivedEntity {
    pub handle: EntityHandle,
    pub position: Vec2,
    pub kind: PerceivedKind,
}

impl PerceivedEntity {
    /// Enemy units and camps not owned by the observer are fair targets
    pub fn is_hostile_target(&self) -> bool {
        match self.kind {
            PerceivedKind::EnemyUnit(_) => true,
            PerceivedKind::Camp(owner) => owner != CampOwner::Ally,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, PerceivedKind::EnemyUnit(_))
    }
}

/// Host-side view of the battlefield for one team
///
/// Implementations answer with the team's own roster and its units' current
/// perception. They never expose the opponent's internal state.
pub trait WorldView: EntityRegistry {
    /// Live units belonging to the commanded team
    fn team_units(&self) -> Vec<UnitSnapshot>;

    /// Whether a vision cell can be walked on
    fn is_walkable(&self, cell: GridCoord) -> bool;

    /// Entities one unit currently perceives with the given sense
    fn perceive(&self, unit: EntityHandle, sense: Sense) -> Vec<PerceivedEntity>;
}
