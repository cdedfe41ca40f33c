//! Entities living on the sandbox battlefield

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, TeamId, Vec2};
use crate::team::roster::{MotionState, UnitArchetype};

/// Fixed per-archetype numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeStats {
    pub max_health: f32,
    /// World units per second
    pub speed: f32,
    pub vision_range: f32,
    pub attack_range: f32,
    pub damage: f32,
    /// Seconds between shots
    pub fire_interval: f32,
    /// Shots per magazine; 0 for unarmed archetypes
    pub magazine: u32,
    pub reload_time: f32,
    /// Radians per second
    pub turn_rate: f32,
}

impl ArchetypeStats {
    pub fn of(archetype: UnitArchetype) -> Self {
        let unarmed = |max_health, speed, vision_range| Self {
            max_health,
            speed,
            vision_range,
            attack_range: 0.0,
            damage: 0.0,
            fire_interval: 0.0,
            magazine: 0,
            reload_time: 0.0,
            turn_rate: 3.0,
        };

        match archetype {
            UnitArchetype::Commander => unarmed(150.0, 50.0, 220.0),
            UnitArchetype::Scout => unarmed(60.0, 100.0, 320.0),
            UnitArchetype::Medic => unarmed(80.0, 60.0, 180.0),
            UnitArchetype::Rifleman => Self {
                max_health: 100.0,
                speed: 60.0,
                vision_range: 200.0,
                attack_range: 150.0,
                damage: 10.0,
                fire_interval: 1.0,
                magazine: 6,
                reload_time: 2.0,
                turn_rate: 3.0,
            },
            UnitArchetype::Sniper => Self {
                max_health: 70.0,
                speed: 45.0,
                vision_range: 280.0,
                attack_range: 260.0,
                damage: 30.0,
                fire_interval: 2.5,
                magazine: 3,
                reload_time: 3.0,
                turn_rate: 2.0,
            },
            UnitArchetype::Tanker => Self {
                max_health: 250.0,
                speed: 35.0,
                vision_range: 160.0,
                attack_range: 120.0,
                damage: 20.0,
                fire_interval: 1.5,
                magazine: 4,
                reload_time: 3.0,
                turn_rate: 1.5,
            },
            UnitArchetype::SiegeMachine => Self {
                max_health: 300.0,
                speed: 25.0,
                vision_range: 180.0,
                attack_range: 300.0,
                damage: 60.0,
                fire_interval: 4.0,
                magazine: 1,
                reload_time: 5.0,
                turn_rate: 1.0,
            },
        }
    }

    pub fn is_armed(&self) -> bool {
        self.magazine > 0
    }
}

/// Medics restore this much health per second to hurt allies in reach
pub const MEDIC_HEAL_RATE: f32 = 5.0;
pub const MEDIC_REACH: f32 = 60.0;
/// Units stop this close to a move destination
pub const ARRIVAL_RADIUS: f32 = 4.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxUnit {
    pub team: TeamId,
    pub archetype: UnitArchetype,
    pub position: Vec2,
    /// Facing in radians, 0 along +x
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub vision_range: f32,
    pub motion: MotionState,
    pub destination: Option<Vec2>,
    /// Radians still to turn
    pub pending_turn: f32,
    pub attack_target: Option<EntityHandle>,
    pub ammo: u32,
    pub fire_cooldown: f32,
    /// Seconds of reload left; `Some` while reloading
    pub reloading: Option<f32>,
}

impl SandboxUnit {
    pub fn new(team: TeamId, archetype: UnitArchetype, position: Vec2) -> Self {
        let stats = ArchetypeStats::of(archetype);
        Self {
            team,
            archetype,
            position,
            facing: 0.0,
            health: stats.max_health,
            max_health: stats.max_health,
            vision_range: stats.vision_range,
            motion: MotionState::Idle,
            destination: None,
            pending_turn: 0.0,
            attack_target: None,
            ammo: stats.magazine,
            fire_cooldown: 0.0,
            reloading: None,
        }
    }

    pub fn stats(&self) -> ArchetypeStats {
        ArchetypeStats::of(self.archetype)
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxCamp {
    /// `None` for neutral camps
    pub owner: Option<TeamId>,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Team that last damaged the camp; it takes the camp at zero health
    pub last_attacker: Option<TeamId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SandboxEntity {
    Unit(SandboxUnit),
    Camp(SandboxCamp),
    Obstacle { position: Vec2 },
}

impl SandboxEntity {
    pub fn position(&self) -> Vec2 {
        match self {
            SandboxEntity::Unit(unit) => unit.position,
            SandboxEntity::Camp(camp) => camp.position,
            SandboxEntity::Obstacle { position } => *position,
        }
    }

    pub fn as_unit(&self) -> Option<&SandboxUnit> {
        match self {
            SandboxEntity::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_unit_mut(&mut self) -> Option<&mut SandboxUnit> {
        match self {
            SandboxEntity::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_camp(&self) -> Option<&SandboxCamp> {
        match self {
            SandboxEntity::Camp(camp) => Some(camp),
            _ => None,
        }
    }

    pub fn as_camp_mut(&mut self) -> Option<&mut SandboxCamp> {
        match self {
            SandboxEntity::Camp(camp) => Some(camp),
            _ => None,
        }
    }
}
