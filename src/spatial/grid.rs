//! Dense grid for per-cell team knowledge

use crate::core::config::MapConfig;
use crate::core::types::{GridCoord, Vec2};

/// Placement of a grid in world space
///
/// The map is centred on the world origin, so cell coordinates run from
/// `min` (negative) up to `min + size - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cell_size: f32,
    pub min: GridCoord,
    pub width: usize,
    pub height: usize,
}

impl GridLayout {
    /// Layout covering a `width`×`height` world-unit map centred on the origin
    pub fn centered(width: f32, height: f32, cell_size: f32) -> Self {
        let half_x = ((width / 2.0) / cell_size).floor() as i32;
        let half_y = ((height / 2.0) / cell_size).floor() as i32;
        Self {
            cell_size,
            min: GridCoord::new(-half_x, -half_y),
            width: (half_x * 2).max(0) as usize,
            height: (half_y * 2).max(0) as usize,
        }
    }

    /// Fine layout used by the vision, location and terrain fields
    pub fn cells(map: &MapConfig) -> Self {
        Self::centered(map.width, map.height, map.cell_size)
    }

    /// Coarse layout used by the influence field
    pub fn regions(map: &MapConfig) -> Self {
        Self::centered(
            map.width,
            map.height,
            map.cell_size * map.influence_block as f32,
        )
    }

    #[inline]
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= self.min.x
            && coord.y >= self.min.y
            && coord.x < self.min.x + self.width as i32
            && coord.y < self.min.y + self.height as i32
    }

    #[inline]
    fn index(&self, coord: GridCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let x = (coord.x - self.min.x) as usize;
        let y = (coord.y - self.min.y) as usize;
        Some(y * self.width + x)
    }

    #[inline]
    fn coord_at(&self, index: usize) -> GridCoord {
        GridCoord::new(
            self.min.x + (index % self.width) as i32,
            self.min.y + (index / self.width) as i32,
        )
    }

    /// Convert world position to cell coordinates (not clamped)
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> GridCoord {
        GridCoord::new(
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, coord: GridCoord) -> Vec2 {
        Vec2::new(
            (coord.x as f32 + 0.5) * self.cell_size,
            (coord.y as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dense 2D grid over a `GridLayout`
#[derive(Debug, Clone)]
pub struct Grid<T: Clone> {
    layout: GridLayout,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(layout: GridLayout, initial: T) -> Self {
        Self {
            layout,
            data: vec![initial; layout.len()],
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    pub fn get(&self, coord: GridCoord) -> Option<&T> {
        self.layout.index(coord).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut T> {
        match self.layout.index(coord) {
            Some(i) => Some(&mut self.data[i]),
            None => None,
        }
    }

    /// Write a value; out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, coord: GridCoord, value: T) {
        if let Some(i) = self.layout.index(coord) {
            self.data[i] = value;
        }
    }

    pub fn fill(&mut self, value: T) {
        for cell in &mut self.data {
            *cell = value.clone();
        }
    }

    /// Iterate cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &T)> {
        let layout = self.layout;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, value)| (layout.coord_at(i), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GridCoord, &mut T)> {
        let layout = self.layout;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(i, value)| (layout.coord_at(i), value))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_layout_bounds() {
        let layout = GridLayout::centered(2048.0, 2048.0, 16.0);
        assert_eq!(layout.min, GridCoord::new(-64, -64));
        assert_eq!(layout.width, 128);
        assert!(layout.contains(GridCoord::new(-64, -64)));
        assert!(layout.contains(GridCoord::new(63, 63)));
        assert!(!layout.contains(GridCoord::new(64, 0)));
        assert!(!layout.contains(GridCoord::new(0, -65)));
    }

    #[test]
    fn test_world_to_cell_floors() {
        let layout = GridLayout::centered(2048.0, 2048.0, 16.0);
        assert_eq!(layout.world_to_cell(Vec2::new(0.0, 15.9)), GridCoord::new(0, 0));
        assert_eq!(layout.world_to_cell(Vec2::new(-0.1, 16.0)), GridCoord::new(-1, 1));
    }

    #[test]
    fn test_cell_center_roundtrip() {
        let layout = GridLayout::centered(512.0, 512.0, 16.0);
        let cell = GridCoord::new(-3, 7);
        assert_eq!(layout.world_to_cell(layout.cell_center(cell)), cell);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = Grid::new(GridLayout::centered(64.0, 64.0, 16.0), 0u8);
        grid.set(GridCoord::new(10, 10), 5);
        assert!(grid.get(GridCoord::new(10, 10)).is_none());

        grid.set(GridCoord::new(-2, 1), 5);
        assert_eq!(grid.get(GridCoord::new(-2, 1)), Some(&5));
    }

    #[test]
    fn test_iter_visits_every_cell_once() {
        let grid = Grid::new(GridLayout::centered(64.0, 64.0, 16.0), 0u8);
        let coords: Vec<_> = grid.iter().map(|(c, _)| c).collect();
        assert_eq!(coords.len(), 16);
        assert_eq!(coords[0], GridCoord::new(-2, -2));
        assert_eq!(coords[15], GridCoord::new(1, 1));
    }
}
