//! Influence field: coarse per-region military presence
//!
//! Each region aggregates a block of location cells. Rebuilds are full
//! recomputations from the location index, and confidence is recomputed from
//! the vision field; neither is incremental.

use serde::{Deserialize, Serialize};

use crate::blackboard::location::{EntityKind, LocationIndex};
use crate::blackboard::vision::VisionField;
use crate::core::config::{InfluenceConfig, MapConfig};
use crate::core::types::GridCoord;
use crate::spatial::{Grid, GridLayout};

/// Strength of a tracked unit whose archetype was never reported
const FALLBACK_STRENGTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InfluenceCell {
    pub ally: f32,
    pub hostile: f32,
    /// Enough of the region was seen recently for the totals to be trusted
    pub confident: bool,
}

impl InfluenceCell {
    /// Positive when friendly presence dominates
    pub fn total(&self) -> f32 {
        self.ally - self.hostile
    }
}

#[derive(Debug, Clone)]
pub struct InfluenceField {
    grid: Grid<InfluenceCell>,
    block: i32,
    config: InfluenceConfig,
}

impl InfluenceField {
    pub fn new(map: &MapConfig, config: &InfluenceConfig) -> Self {
        Self {
            grid: Grid::new(GridLayout::regions(map), InfluenceCell::default()),
            block: map.influence_block,
            config: config.clone(),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        self.grid.layout()
    }

    /// Region containing a location cell
    pub fn region_of(&self, cell: GridCoord) -> GridCoord {
        cell.region(self.block)
    }

    pub fn get(&self, region: GridCoord) -> Option<&InfluenceCell> {
        self.grid.get(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &InfluenceCell)> {
        self.grid.iter()
    }

    fn add(&mut self, region: GridCoord, amount: f32, ally: bool) {
        if let Some(cell) = self.grid.get_mut(region) {
            if ally {
                cell.ally += amount;
            } else {
                cell.hostile += amount;
            }
        }
    }

    /// Recompute accumulators from every unit in the location index
    pub fn rebuild(&mut self, location: &LocationIndex) {
        for cell in self.grid.values_mut() {
            cell.ally = 0.0;
            cell.hostile = 0.0;
        }

        let radius = self.config.spread_radius;
        for record in location.units() {
            let region = self.region_of(record.cell);
            if !self.grid.layout().contains(region) {
                continue;
            }

            let base = record
                .archetype
                .map_or(FALLBACK_STRENGTH, |a| a.influence_strength());
            let strength = base * record.health_fraction().max(0.0);
            let ally = record.kind == EntityKind::AllyUnit;

            self.add(region, strength, ally);
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    let distance = ((dx * dx + dy * dy) as f32).sqrt();
                    if distance == 0.0 || distance > radius as f32 {
                        continue;
                    }
                    self.add(region.offset(dx, dy), strength / (distance + 1.0), ally);
                }
            }
        }
    }

    /// Mark regions whose sub-cells were seen recently enough
    pub fn refresh_confidence(&mut self, vision: &VisionField) {
        let block = self.block;
        let window = self.config.confidence_window;
        let needed = self.config.confidence_min_cells;

        for (region, cell) in self.grid.iter_mut() {
            let mut recent = 0;
            for ox in 0..block {
                for oy in 0..block {
                    let sub = GridCoord::new(region.x * block + ox, region.y * block + oy);
                    if vision.time_since_seen(sub) < window {
                        recent += 1;
                    }
                }
            }
            cell.confident = recent >= needed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::location::Observation;
    use crate::core::arena::Arena;
    use crate::core::types::{EntityHandle, Vec2};
    use crate::team::roster::UnitArchetype;
    use proptest::prelude::*;

    fn setup() -> (MapConfig, InfluenceField, LocationIndex, VisionField) {
        let map = MapConfig::default();
        let field = InfluenceField::new(&map, &InfluenceConfig::default());
        let location = LocationIndex::new(GridLayout::cells(&map));
        let vision = VisionField::new(GridLayout::cells(&map));
        (map, field, location, vision)
    }

    fn rifleman(handle: EntityHandle, pos: Vec2, health: f32) -> Observation {
        Observation {
            handle,
            position: pos,
            health,
            max_health: 100.0,
            archetype: Some(UnitArchetype::Rifleman),
        }
    }

    #[test]
    fn test_single_ally_contribution() {
        let (_, mut field, mut location, _) = setup();
        let mut arena = Arena::new();
        let unit = arena.insert(());
        // cell (4, 4) lies in region (1, 1)
        location.upsert(&rifleman(unit, Vec2::new(72.0, 72.0), 100.0), EntityKind::AllyUnit, &arena);
        field.rebuild(&location);

        let origin = GridCoord::new(1, 1);
        assert_eq!(field.get(origin).map(|c| c.ally), Some(7.5));
        assert_eq!(field.get(origin.offset(1, 0)).map(|c| c.ally), Some(7.5 / 2.0));
        assert_eq!(field.get(origin.offset(0, -3)).map(|c| c.ally), Some(7.5 / 4.0));
        assert_eq!(field.get(origin.offset(3, 1)).map(|c| c.ally), Some(0.0));
        assert_eq!(field.get(origin).map(|c| c.hostile), Some(0.0));
    }

    #[test]
    fn test_health_scales_strength() {
        let (_, mut field, mut location, _) = setup();
        let mut arena = Arena::new();
        let unit = arena.insert(());
        location.upsert(&rifleman(unit, Vec2::new(-8.0, -8.0), 50.0), EntityKind::EnemyUnit, &arena);
        field.rebuild(&location);

        let cell = field.get(GridCoord::new(-1, -1)).copied().unwrap_or_default();
        assert_eq!(cell.hostile, 3.75);
        assert_eq!(cell.total(), -3.75);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let (_, mut field, mut location, _) = setup();
        let mut arena = Arena::new();
        let unit = arena.insert(());
        location.upsert(&rifleman(unit, Vec2::new(0.0, 0.0), 100.0), EntityKind::AllyUnit, &arena);

        field.rebuild(&location);
        let first: Vec<f32> = field.iter().map(|(_, c)| c.ally).collect();
        field.rebuild(&location);
        let second: Vec<f32> = field.iter().map(|(_, c)| c.ally).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_confidence_needs_four_recent_cells() {
        let (_, mut field, _, mut vision) = setup();
        for x in 0..3 {
            vision.mark_seen(GridCoord::new(x, 0));
        }
        field.refresh_confidence(&vision);
        assert_eq!(field.get(GridCoord::ZERO).map(|c| c.confident), Some(false));

        vision.mark_seen(GridCoord::new(3, 3));
        field.refresh_confidence(&vision);
        assert_eq!(field.get(GridCoord::ZERO).map(|c| c.confident), Some(true));

        vision.age(5.0);
        field.refresh_confidence(&vision);
        assert_eq!(field.get(GridCoord::ZERO).map(|c| c.confident), Some(false));
    }

    proptest! {
        #[test]
        fn prop_spread_follows_distance_falloff(
            rx in -10i32..10,
            ry in -10i32..10,
            dx in -3i32..=3,
            dy in -3i32..=3,
        ) {
            let (_, mut field, mut location, _) = setup();
            let mut arena = Arena::new();
            let unit = arena.insert(());
            let origin = GridCoord::new(rx, ry);
            let pos = field.layout().cell_center(origin);
            location.upsert(&rifleman(unit, pos, 100.0), EntityKind::AllyUnit, &arena);
            field.rebuild(&location);

            let d = ((dx * dx + dy * dy) as f32).sqrt();
            let got = field.get(origin.offset(dx, dy)).map_or(0.0, |c| c.ally);
            let expected = if d == 0.0 {
                7.5
            } else if d <= 3.0 {
                7.5 / (d + 1.0)
            } else {
                0.0
            };
            prop_assert!((got - expected).abs() < 1e-5);
        }

        #[test]
        fn prop_confidence_iff_four_recent(seen in prop::collection::btree_set((0i32..4, 0i32..4), 0..16)) {
            let (_, mut field, _, mut vision) = setup();
            for (x, y) in &seen {
                vision.mark_seen(GridCoord::new(*x, *y));
            }
            field.refresh_confidence(&vision);
            let confident = field.get(GridCoord::ZERO).map_or(false, |c| c.confident);
            prop_assert_eq!(confident, seen.len() >= 4);
        }
    }
}
