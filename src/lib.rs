//! War Commander - belief/desire/intention tactical AI for team battles
//!
//! A commander keeps a team blackboard fed by perception, derives beliefs
//! from it, picks a desire on a fixed cadence and drives the matching plan,
//! emitting orders for the host to apply. The `sandbox` module is a small
//! host used by the runner and the tests.

pub mod bdi;
pub mod blackboard;
pub mod core;
#[cfg(feature = "sandbox")]
pub mod sandbox;
pub mod spatial;
pub mod team;
