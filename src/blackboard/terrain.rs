//! Terrain learned from what the team has looked at

use serde::{Deserialize, Serialize};

use crate::core::types::GridCoord;
use crate::spatial::{Grid, GridLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainKind {
    #[default]
    Unknown,
    Granite,
    Mountain,
    Bridge,
    Gravel,
    Water,
}

impl TerrainKind {
    pub fn is_passable(&self) -> bool {
        !matches!(self, TerrainKind::Water)
    }

    /// Relative movement cost, `None` when impassable
    ///
    /// Unknown terrain is costed like open ground.
    pub fn movement_cost(&self) -> Option<f32> {
        match self {
            TerrainKind::Granite | TerrainKind::Bridge | TerrainKind::Unknown => Some(1.0),
            TerrainKind::Gravel => Some(1.2),
            TerrainKind::Mountain => Some(2.0),
            TerrainKind::Water => None,
        }
    }
}

/// Per-cell terrain the team has observed
#[derive(Debug, Clone)]
pub struct TerrainField {
    grid: Grid<TerrainKind>,
}

impl TerrainField {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            grid: Grid::new(layout, TerrainKind::Unknown),
        }
    }

    /// Record an observation; the first known value for a cell sticks
    pub fn observe(&mut self, cell: GridCoord, kind: TerrainKind) {
        if let Some(current) = self.grid.get_mut(cell) {
            if *current == TerrainKind::Unknown {
                *current = kind;
            }
        }
    }

    pub fn get(&self, cell: GridCoord) -> TerrainKind {
        self.grid.get(cell).copied().unwrap_or_default()
    }

    pub fn known_cells(&self) -> usize {
        self.grid
            .iter()
            .filter(|(_, kind)| **kind != TerrainKind::Unknown)
            .count()
    }
}
