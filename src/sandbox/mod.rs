//! Sandbox host for exercising commanders
//!
//! A small deterministic battlefield that owns the units, applies orders and
//! produces the per-team sighting batches a commander expects from a game.

pub mod battlefield;
pub mod entity;
pub mod perception;
pub mod scenario;

pub use battlefield::{relative_owner, Battlefield};
pub use entity::{ArchetypeStats, SandboxCamp, SandboxEntity, SandboxUnit};
pub use perception::{in_sense, TeamView};
pub use scenario::{skirmish, BLUE, RED};
