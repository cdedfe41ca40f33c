//! Vision field: seconds since each cell was last observed

use crate::core::types::GridCoord;
use crate::spatial::{Grid, GridLayout};

/// Age of a cell that has never been observed
pub const NEVER_SEEN: f32 = f32::INFINITY;

/// Ages saturate here so a long match never overflows into the sentinel
const AGE_CEILING: f32 = 1.0e9;

/// Dense per-cell record of how long ago the team last saw each cell
#[derive(Debug, Clone)]
pub struct VisionField {
    grid: Grid<f32>,
}

impl VisionField {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            grid: Grid::new(layout, NEVER_SEEN),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        self.grid.layout()
    }

    /// Advance every observed cell by `delta` seconds
    pub fn age(&mut self, delta: f32) {
        for age in self.grid.values_mut() {
            if age.is_finite() {
                *age = (*age + delta).min(AGE_CEILING);
            }
        }
    }

    /// Reset a cell to "seen just now"; returns false when the cell is off the map
    pub fn mark_seen(&mut self, cell: GridCoord) -> bool {
        match self.grid.get_mut(cell) {
            Some(age) => {
                *age = 0.0;
                true
            }
            None => false,
        }
    }

    /// Seconds since `cell` was last seen; `NEVER_SEEN` for unknown or off-map cells
    pub fn time_since_seen(&self, cell: GridCoord) -> f32 {
        self.grid.get(cell).copied().unwrap_or(NEVER_SEEN)
    }

    pub fn was_ever_seen(&self, cell: GridCoord) -> bool {
        self.time_since_seen(cell).is_finite()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, f32)> + '_ {
        self.grid.iter().map(|(cell, age)| (cell, *age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_field() -> VisionField {
        VisionField::new(GridLayout::centered(128.0, 128.0, 16.0))
    }

    #[test]
    fn test_new_field_is_never_seen() {
        let field = small_field();
        assert!(field.iter().all(|(_, age)| age == NEVER_SEEN));
    }

    #[test]
    fn test_sentinel_cells_do_not_age() {
        let mut field = small_field();
        field.age(3.0);
        assert_eq!(field.time_since_seen(GridCoord::new(0, 0)), NEVER_SEEN);
    }

    #[test]
    fn test_mark_seen_resets_old_cell() {
        let mut field = small_field();
        let cell = GridCoord::new(-2, 3);
        assert!(field.mark_seen(cell));
        field.age(12.5);
        assert_eq!(field.time_since_seen(cell), 12.5);

        field.mark_seen(cell);
        assert_eq!(field.time_since_seen(cell), 0.0);
    }

    #[test]
    fn test_off_map_queries_return_sentinel() {
        let mut field = small_field();
        assert!(!field.mark_seen(GridCoord::new(100, 0)));
        assert_eq!(field.time_since_seen(GridCoord::new(100, 0)), NEVER_SEEN);
    }

    #[test]
    fn test_age_saturates_below_sentinel() {
        let mut field = small_field();
        let cell = GridCoord::new(1, 1);
        field.mark_seen(cell);
        field.age(f32::MAX);
        assert!(field.was_ever_seen(cell));
        assert_eq!(field.time_since_seen(cell), AGE_CEILING);
    }

    proptest! {
        #[test]
        fn prop_aging_adds_exactly_delta(
            seen in prop::collection::vec((-4i32..4, -4i32..4), 0..20),
            deltas in prop::collection::vec(0.0f32..2.0, 1..10),
        ) {
            let mut field = small_field();
            for (x, y) in &seen {
                field.mark_seen(GridCoord::new(*x, *y));
            }

            for delta in deltas {
                let before: Vec<f32> = field.iter().map(|(_, age)| age).collect();
                field.age(delta);
                for ((_, after), prior) in field.iter().zip(before) {
                    if prior.is_finite() {
                        prop_assert_eq!(after, prior + delta);
                    } else {
                        prop_assert_eq!(after, NEVER_SEEN);
                    }
                }
            }
        }

        #[test]
        fn prop_mark_seen_always_zeroes(x in -4i32..4, y in -4i32..4, delta in 0.0f32..100.0) {
            let mut field = small_field();
            let cell = GridCoord::new(x, y);
            field.mark_seen(cell);
            field.age(delta);
            field.mark_seen(cell);
            prop_assert_eq!(field.time_since_seen(cell), 0.0);
        }
    }
}
