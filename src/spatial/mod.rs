//! Spatial primitives shared by the team fields

pub mod grid;

pub use grid::{Grid, GridLayout};
