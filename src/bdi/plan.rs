//! Plan interface shared by every desire's executor

use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::Rng;

use crate::bdi::beliefs::BeliefBase;
use crate::blackboard::Blackboard;
use crate::core::config::CommanderConfig;
use crate::core::types::{GridCoord, Vec2};
use crate::team::orders::Order;
use crate::team::view::WorldView;

/// Per-tick outcome of a plan step
///
/// The executor only cares about this for logging; an intention ends through
/// invalidity or timeout, never through its plan's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Running,
    Success,
    Failure,
}

/// Destination cells already promised to some unit under the current intention
#[derive(Debug, Clone, Default)]
pub struct ClaimedCells {
    cells: AHashSet<GridCoord>,
}

impl ClaimedCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a cell; false if someone already holds it
    pub fn claim(&mut self, cell: GridCoord) -> bool {
        self.cells.insert(cell)
    }

    pub fn is_claimed(&self, cell: GridCoord) -> bool {
        self.cells.contains(&cell)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Everything a plan may read or emit during one tick
pub struct PlanContext<'a> {
    pub beliefs: &'a BeliefBase,
    pub blackboard: &'a Blackboard,
    pub world: &'a dyn WorldView,
    pub config: &'a CommanderConfig,
    pub rng: &'a mut StdRng,
    pub orders: &'a mut Vec<Order>,
}

impl<'a> PlanContext<'a> {
    pub fn issue(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Uniform offset in a square of half-side `amount`
    pub fn jitter(&mut self, amount: f32) -> Vec2 {
        if amount <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.gen_range(-amount..=amount),
            self.rng.gen_range(-amount..=amount),
        )
    }

    /// Vision cell containing a world position
    pub fn cell_of(&self, position: Vec2) -> GridCoord {
        self.blackboard.location().layout().world_to_cell(position)
    }
}

/// A stateful per-intention executor
pub trait Plan: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Advance the plan by one tick
    fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        delta: f32,
        claimed: &mut ClaimedCells,
    ) -> PlanStatus;

    /// Release everything the plan holds; called when its intention ends
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_are_exclusive() {
        let mut claimed = ClaimedCells::new();
        assert!(claimed.claim(GridCoord::new(1, 2)));
        assert!(!claimed.claim(GridCoord::new(1, 2)));
        assert!(claimed.is_claimed(GridCoord::new(1, 2)));

        claimed.clear();
        assert!(claimed.is_empty());
        assert!(claimed.claim(GridCoord::new(1, 2)));
    }
}
