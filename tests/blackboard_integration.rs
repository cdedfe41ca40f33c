//! Blackboard fields and desire selection through the public API

use proptest::prelude::*;

use war_commander::bdi::{select_desire, BeliefBase, DesireKind};
use war_commander::blackboard::{
    EntityKind, InfluenceField, LocationIndex, Observation, UnitSighting, UpsertOutcome, VisionField,
    NEVER_SEEN,
};
use war_commander::core::arena::Arena;
use war_commander::core::config::{CommanderConfig, InfluenceConfig, MapConfig};
use war_commander::core::types::{EntityHandle, GridCoord, Vec2};
use war_commander::spatial::GridLayout;
use war_commander::team::{UnitArchetype, UnitSnapshot};

fn cells() -> GridLayout {
    GridLayout::cells(&MapConfig::default())
}

fn sighting(handle: EntityHandle, archetype: UnitArchetype, position: Vec2) -> Observation {
    Observation::from(&UnitSighting {
        handle,
        archetype,
        position,
        health: 100.0,
        max_health: 100.0,
    })
}

#[test]
fn test_vision_ages_only_seen_cells() {
    let mut vision = VisionField::new(cells());
    let seen = GridCoord::new(3, -7);
    assert!(vision.mark_seen(seen));

    vision.age(0.5);
    vision.age(0.25);
    assert_eq!(vision.time_since_seen(seen), 0.75);
    assert_eq!(vision.time_since_seen(GridCoord::new(4, -7)), NEVER_SEEN);

    vision.mark_seen(seen);
    assert_eq!(vision.time_since_seen(seen), 0.0);

    // off the map
    assert!(!vision.mark_seen(GridCoord::new(500, 0)));
    assert_eq!(vision.time_since_seen(GridCoord::new(500, 0)), NEVER_SEEN);
}

#[test]
fn test_upsert_is_idempotent_per_cell() {
    let mut arena = Arena::new();
    let enemy = arena.insert(());
    let mut index = LocationIndex::new(cells());

    let obs = sighting(enemy, UnitArchetype::Sniper, Vec2::new(40.0, 40.0));
    assert_eq!(index.upsert(&obs, EntityKind::EnemyUnit, &arena), UpsertOutcome::Inserted);
    assert_eq!(index.upsert(&obs, EntityKind::EnemyUnit, &arena), UpsertOutcome::Refreshed);
    assert_eq!(index.len(), 1);
    assert_eq!(index.get(GridCoord::new(2, 2)).map(|r| r.handle), Some(enemy));
}

#[test]
fn test_relocation_clears_old_cell() {
    let mut arena = Arena::new();
    let enemy = arena.insert(());
    let mut index = LocationIndex::new(cells());

    index.upsert(
        &sighting(enemy, UnitArchetype::Tanker, Vec2::new(40.0, 40.0)),
        EntityKind::EnemyUnit,
        &arena,
    );
    let outcome = index.upsert(
        &sighting(enemy, UnitArchetype::Tanker, Vec2::new(100.0, 40.0)),
        EntityKind::EnemyUnit,
        &arena,
    );

    assert_eq!(outcome, UpsertOutcome::Relocated { from: GridCoord::new(2, 2) });
    assert!(index.get(GridCoord::new(2, 2)).is_none());
    assert_eq!(index.get(GridCoord::new(6, 2)).map(|r| r.handle), Some(enemy));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_dead_entities_are_collected() {
    let mut arena = Arena::new();
    let enemy = arena.insert(());
    let other = arena.insert(());
    let mut index = LocationIndex::new(cells());

    index.upsert(
        &sighting(enemy, UnitArchetype::Rifleman, Vec2::new(40.0, 40.0)),
        EntityKind::EnemyUnit,
        &arena,
    );
    arena.remove(enemy);
    index.upsert(
        &sighting(other, UnitArchetype::Rifleman, Vec2::new(-40.0, 40.0)),
        EntityKind::EnemyUnit,
        &arena,
    );

    assert!(index.find(enemy).is_none());
    assert_eq!(index.len(), 1);
}

fn ally(field: &InfluenceField, x: i32, y: i32) -> Option<f32> {
    field.get(GridCoord::new(x, y)).map(|c| c.ally)
}

#[test]
fn test_influence_decays_with_region_distance() {
    let mut arena = Arena::new();
    let rifle = arena.insert(());
    let mut index = LocationIndex::new(cells());
    index.upsert(
        &sighting(rifle, UnitArchetype::Rifleman, Vec2::new(8.0, 8.0)),
        EntityKind::AllyUnit,
        &arena,
    );

    let mut influence = InfluenceField::new(&MapConfig::default(), &InfluenceConfig::default());
    influence.rebuild(&index);

    assert_eq!(ally(&influence, 0, 0), Some(7.5));
    assert_eq!(ally(&influence, 1, 0), Some(7.5 / 2.0));
    assert_eq!(ally(&influence, 0, -3), Some(7.5 / 4.0));
    assert_eq!(ally(&influence, 4, 0), Some(0.0));
    let diagonal = ally(&influence, 2, 2).unwrap_or_default();
    assert!((diagonal - 7.5 / (8.0_f32.sqrt() + 1.0)).abs() < 1e-5);

    // rebuild is a full recomputation
    influence.rebuild(&index);
    assert_eq!(ally(&influence, 0, 0), Some(7.5));
}

#[test]
fn test_influence_confidence_needs_four_recent_cells() {
    let config = CommanderConfig::default();
    let mut vision = VisionField::new(cells());
    let mut influence = InfluenceField::new(&config.map, &config.influence);

    for x in 0..3 {
        vision.mark_seen(GridCoord::new(x, 0));
    }
    influence.refresh_confidence(&vision);
    assert_eq!(influence.get(GridCoord::ZERO).map(|c| c.confident), Some(false));

    vision.mark_seen(GridCoord::new(3, 3));
    influence.refresh_confidence(&vision);
    assert_eq!(influence.get(GridCoord::ZERO).map(|c| c.confident), Some(true));

    vision.age(5.0);
    influence.refresh_confidence(&vision);
    assert_eq!(influence.get(GridCoord::ZERO).map(|c| c.confident), Some(false));
}

#[test]
fn test_utility_ties_go_to_higher_priority() {
    let scout = UnitSnapshot::new(EntityHandle::new(0, 0), UnitArchetype::Scout, Vec2::ZERO);
    let mut beliefs = BeliefBase::new();
    beliefs.camp_under_attack = true;
    beliefs.scouting_needed = true;
    beliefs.unexplored_cells = vec![GridCoord::ZERO; 25];
    beliefs.healthy_scouts = vec![scout];

    // both score 70
    assert_eq!(DesireKind::DefendCamp.utility(&beliefs), 70.0);
    assert_eq!(DesireKind::Scout.utility(&beliefs), 70.0);
    assert_eq!(select_desire(&beliefs), Some((DesireKind::DefendCamp, 70.0)));
}

fn attacker(index: u32) -> UnitSnapshot {
    UnitSnapshot::new(EntityHandle::new(index, 0), UnitArchetype::Rifleman, Vec2::ZERO)
}

proptest! {
    #[test]
    fn prop_some_desire_always_selected(
        low_health in any::<bool>(),
        has_base in any::<bool>(),
        under_attack in any::<bool>(),
        scouting in any::<bool>(),
        scouts in 0usize..3,
        attackers in 0u32..8,
        march in any::<bool>(),
        commander in any::<bool>(),
        neutral in 0usize..4,
        enemy in 0usize..4,
    ) {
        let mut beliefs = BeliefBase::new();
        beliefs.low_health_units_present = low_health;
        beliefs.team_base = has_base.then_some(GridCoord::ZERO);
        beliefs.camp_under_attack = under_attack;
        beliefs.scouting_needed = scouting;
        beliefs.unexplored_cells = if scouting { vec![GridCoord::ZERO; 12] } else { Vec::new() };
        beliefs.healthy_scouts = (0..scouts)
            .map(|i| UnitSnapshot::new(EntityHandle::new(100 + i as u32, 0), UnitArchetype::Scout, Vec2::ZERO))
            .collect();
        beliefs.healthy_attackers = (0..attackers).map(attacker).collect();
        beliefs.march_opportunity = march;
        beliefs.sees_enemy_commander = commander;
        beliefs.average_team_health = 1.0;
        beliefs.neutral_camp_count = neutral;
        beliefs.enemy_camp_count = enemy;

        let selected = select_desire(&beliefs);
        prop_assert!(selected.is_some());
        let (desire, utility) = selected.unwrap_or((DesireKind::Guard, 0.0));
        prop_assert!(desire.is_relevant(&beliefs));
        for other in DesireKind::PRIORITY {
            if other.is_relevant(&beliefs) {
                prop_assert!(other.utility(&beliefs) <= utility);
            }
        }
    }
}
