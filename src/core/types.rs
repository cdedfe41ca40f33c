//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Stable handle to a live game entity
///
/// The generation is bumped every time an arena slot is reused, so a handle
/// held past its entity's death compares unequal to whatever lives in the
/// slot afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle {
    pub index: u32,
    pub generation: u32,
}

impl EntityHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Team identifier (1 = blue, 2 = red in the default scenarios)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u8);

/// Integer cell coordinate on one of the team grids
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const ZERO: GridCoord = GridCoord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance in cells
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Coarse region containing this cell when cells are grouped in `block`×`block` squares
    ///
    /// Uses Euclidean division so that cell -1 lands in region -1, not 0.
    pub fn region(&self, block: i32) -> Self {
        Self::new(self.x.div_euclid(block), self.y.div_euclid(block))
    }

    /// The 3x3 neighbourhood including this cell
    pub fn neighbourhood(self) -> impl Iterator<Item = GridCoord> {
        (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| self.offset(dx, dy)))
    }
}

impl std::ops::Add for GridCoord {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_distance() {
        let a = GridCoord::new(0, 0);
        let b = GridCoord::new(3, 4);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_region_handles_negative_cells() {
        assert_eq!(GridCoord::new(0, 3).region(4), GridCoord::new(0, 0));
        assert_eq!(GridCoord::new(4, 7).region(4), GridCoord::new(1, 1));
        assert_eq!(GridCoord::new(-1, -4).region(4), GridCoord::new(-1, -1));
        assert_eq!(GridCoord::new(-5, 0).region(4), GridCoord::new(-2, 0));
    }

    #[test]
    fn test_neighbourhood_is_3x3() {
        let center = GridCoord::new(2, 2);
        let cells: Vec<_> = center.neighbourhood().collect();
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&GridCoord::new(1, 1)));
        assert!(cells.contains(&GridCoord::new(3, 3)));
        assert!(cells.contains(&center));
    }

    #[test]
    fn test_handle_equality_includes_generation() {
        let a = EntityHandle::new(3, 0);
        let b = EntityHandle::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a, EntityHandle::new(3, 0));
    }
}
