//! Stock battle setups

use rand::Rng;

use crate::blackboard::TerrainKind;
use crate::core::config::MapConfig;
use crate::core::types::{GridCoord, TeamId, Vec2};
use crate::sandbox::battlefield::Battlefield;
use crate::team::roster::UnitArchetype;

pub const BLUE: TeamId = TeamId(1);
pub const RED: TeamId = TeamId(2);

const BASE_HEALTH: f32 = 1000.0;
const OUTPOST_HEALTH: f32 = 400.0;
const MOUNTAIN_PATCHES: usize = 6;
const GRAVEL_CELLS: usize = 40;

/// One side's starting roster, offsets relative to its base facing the enemy
const ROSTER: &[(UnitArchetype, f32, f32)] = &[
    (UnitArchetype::Commander, -40.0, 0.0),
    (UnitArchetype::Rifleman, 40.0, -60.0),
    (UnitArchetype::Rifleman, 40.0, -20.0),
    (UnitArchetype::Rifleman, 40.0, 20.0),
    (UnitArchetype::Rifleman, 40.0, 60.0),
    (UnitArchetype::Sniper, 0.0, -90.0),
    (UnitArchetype::Sniper, 0.0, 90.0),
    (UnitArchetype::Tanker, 80.0, 0.0),
    (UnitArchetype::Scout, 100.0, -120.0),
    (UnitArchetype::Scout, 100.0, 120.0),
    (UnitArchetype::Medic, -20.0, 40.0),
    (UnitArchetype::SiegeMachine, -60.0, -40.0),
];

fn spawn_side(field: &mut Battlefield, team: TeamId, base: Vec2, forward: f32) {
    field.spawn_camp(Some(team), base, BASE_HEALTH);
    let facing = if forward > 0.0 { 0.0 } else { std::f32::consts::PI };
    for &(archetype, ahead, across) in ROSTER {
        let unit = field.spawn_unit(team, archetype, base + Vec2::new(ahead * forward, across));
        field.set_facing(unit, facing);
    }
}

/// Mirror a cell across the vertical centre line
fn mirror(cell: GridCoord) -> GridCoord {
    GridCoord::new(-cell.x - 1, cell.y)
}

fn paint_terrain(field: &mut Battlefield) {
    let layout = *field.layout();
    let min = layout.min;
    let max_y = min.y + layout.height as i32 - 1;

    // river down the middle with three crossings
    for y in min.y..=max_y {
        let crossing = (-3..=2).contains(&y) || (29..=33).contains(&y.abs());
        let kind = if crossing {
            TerrainKind::Bridge
        } else {
            TerrainKind::Water
        };
        field.set_terrain(GridCoord::new(-1, y), kind);
        field.set_terrain(GridCoord::new(0, y), kind);
    }

    // mirrored highlands and scree
    let half_width = layout.width as i32 / 2;
    for _ in 0..MOUNTAIN_PATCHES {
        let centre = GridCoord::new(
            field.rng().gen_range(4..half_width - 4),
            field.rng().gen_range(min.y + 4..max_y - 4),
        );
        for cell in centre.neighbourhood() {
            field.set_terrain(cell, TerrainKind::Mountain);
            field.set_terrain(mirror(cell), TerrainKind::Mountain);
        }
    }
    for _ in 0..GRAVEL_CELLS {
        let cell = GridCoord::new(
            field.rng().gen_range(2..half_width),
            field.rng().gen_range(min.y..=max_y),
        );
        if field.terrain_at(cell) == TerrainKind::Granite {
            field.set_terrain(cell, TerrainKind::Gravel);
            field.set_terrain(mirror(cell), TerrainKind::Gravel);
        }
    }
}

/// Two mirrored teams, three neutral outposts on the river crossings and
/// seeded terrain
pub fn skirmish(map: MapConfig, seed: u64) -> Battlefield {
    let reach = map.width * 0.4;
    let outpost_spread = map.height * 0.25;
    let mut field = Battlefield::new(map, seed);

    paint_terrain(&mut field);

    spawn_side(&mut field, BLUE, Vec2::new(-reach, 0.0), 1.0);
    spawn_side(&mut field, RED, Vec2::new(reach, 0.0), -1.0);

    for y in [-outpost_spread, 0.0, outpost_spread] {
        field.spawn_camp(None, Vec2::new(0.0, y), OUTPOST_HEALTH);
    }
    for offset in [Vec2::new(-250.0, 200.0), Vec2::new(-250.0, -200.0)] {
        field.spawn_obstacle(offset);
        field.spawn_obstacle(Vec2::new(-offset.x, offset.y));
    }

    tracing::debug!(seed, entities = field.entities().len(), "Skirmish ready");
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skirmish_is_mirrored() {
        let field = skirmish(MapConfig::default(), 4);
        assert_eq!(field.units_of(BLUE).count(), ROSTER.len());
        assert_eq!(field.units_of(RED).count(), ROSTER.len());
        assert_eq!(field.camps_owned_by(BLUE), 1);
        assert_eq!(field.camps_owned_by(RED), 1);
        assert_eq!(field.camps().filter(|(_, c)| c.owner.is_none()).count(), 3);

        for x in 1..20 {
            let cell = GridCoord::new(x, 7);
            assert_eq!(field.terrain_at(cell), field.terrain_at(mirror(cell)));
        }
    }

    #[test]
    fn test_outposts_sit_on_crossings() {
        let field = skirmish(MapConfig::default(), 4);
        for (_, camp) in field.camps().filter(|(_, c)| c.owner.is_none()) {
            let cell = field.layout().world_to_cell(camp.position);
            assert_eq!(field.terrain_at(cell), TerrainKind::Bridge);
        }
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let a = skirmish(MapConfig::default(), 12);
        let b = skirmish(MapConfig::default(), 12);
        for x in -64..64 {
            for y in [-40, -5, 0, 17, 50] {
                let cell = GridCoord::new(x, y);
                assert_eq!(a.terrain_at(cell), b.terrain_at(cell));
            }
        }
    }
}
