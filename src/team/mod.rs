//! Team-facing interface of the commander
//!
//! Architecture: Trait + Data hybrid
//! - TeamAi trait defines the interface for swappable reasoning architectures
//! - WorldView is how a commander reads the host game
//! - Orders flow back out as plain data

pub mod orders;
pub mod roster;
pub mod view;

pub use orders::{Order, OrderType};
pub use roster::{MotionState, UnitArchetype, UnitSnapshot};
pub use view::{CampOwner, PerceivedEntity, PerceivedKind, Sense, WorldView};

use crate::blackboard::SightingBatch;

/// Trait for team AI implementations
pub trait TeamAi {
    /// Process a single tick - returns orders for the host to apply
    fn process_tick(
        &mut self,
        world: &dyn WorldView,
        sightings: SightingBatch,
        delta: f32,
    ) -> Vec<Order>;

    /// Short name used in logs and runner output
    fn name(&self) -> &str;
}
