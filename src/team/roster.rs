//! Unit roster as seen by the commander
//!
//! The host game owns the units; each tick it hands the commander a list of
//! `UnitSnapshot`s for the team.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, Vec2};

/// Unit archetypes fielded by both teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitArchetype {
    Commander,
    Rifleman,
    Sniper,
    Tanker,
    Scout,
    SiegeMachine,
    Medic,
}

impl UnitArchetype {
    /// Presence this archetype projects onto the influence field at full health
    ///
    /// Scouts, medics and commanders carry no weapon and only project a token value.
    pub fn influence_strength(&self) -> f32 {
        match self {
            UnitArchetype::Rifleman => 7.5,
            UnitArchetype::Sniper => 10.0,
            UnitArchetype::Tanker => 6.0,
            UnitArchetype::SiegeMachine => 10.0,
            UnitArchetype::Commander | UnitArchetype::Scout | UnitArchetype::Medic => 2.0,
        }
    }

    /// Whether this archetype carries a weapon
    pub fn can_attack(&self) -> bool {
        matches!(
            self,
            UnitArchetype::Rifleman
                | UnitArchetype::Sniper
                | UnitArchetype::Tanker
                | UnitArchetype::SiegeMachine
        )
    }

    pub fn is_scout(&self) -> bool {
        matches!(self, UnitArchetype::Scout)
    }

    pub fn is_commander(&self) -> bool {
        matches!(self, UnitArchetype::Commander)
    }
}

/// Locomotion state reported by a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Idle,
    Moving,
    Attacking,
    Rotating,
    Dead,
}

/// One friendly unit at the start of a tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub handle: EntityHandle,
    pub archetype: UnitArchetype,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub motion: MotionState,
    pub weapon_reloading: bool,
    pub attack_target: Option<EntityHandle>,
}

impl UnitSnapshot {
    pub fn new(handle: EntityHandle, archetype: UnitArchetype, position: Vec2) -> Self {
        Self {
            handle,
            archetype,
            position,
            health: 100.0,
            max_health: 100.0,
            motion: MotionState::Idle,
            weapon_reloading: false,
            attack_target: None,
        }
    }

    pub fn with_health(mut self, health: f32, max_health: f32) -> Self {
        self.health = health;
        self.max_health = max_health;
        self
    }

    pub fn with_motion(mut self, motion: MotionState) -> Self {
        self.motion = motion;
        self
    }

    /// Current health as a fraction of max (0 when max is not positive)
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    pub fn is_idle(&self) -> bool {
        self.motion == MotionState::Idle
    }

    pub fn is_alive(&self) -> bool {
        self.motion != MotionState::Dead && self.health > 0.0
    }
}
