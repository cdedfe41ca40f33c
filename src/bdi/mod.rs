//! Belief-desire-intention commander
//!
//! Architecture:
//! - `BeliefBase` derives facts from the roster and the blackboard each tick
//! - `DesireKind` scores what the team could want
//! - `Intention` binds the chosen desire to a stateful `Plan`
//! - `BdiCommander` runs the loop and implements `TeamAi`

pub mod beliefs;
pub mod commander;
pub mod desire;
pub mod intention;
pub mod plan;
pub mod plans;

pub use beliefs::BeliefBase;
pub use commander::{BdiCommander, CommanderStats};
pub use desire::{select_desire, DesireKind};
pub use intention::{Intention, Termination};
pub use plan::{ClaimedCells, Plan, PlanContext, PlanStatus};
