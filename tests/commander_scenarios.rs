//! Commander behaviour on small sandbox battlefields

use war_commander::bdi::{BdiCommander, DesireKind};
use war_commander::core::config::CommanderConfig;
use war_commander::core::types::{GridCoord, TeamId, Vec2};
use war_commander::sandbox::{Battlefield, BLUE, RED};
use war_commander::team::{Order, OrderType, TeamAi, UnitArchetype};

const DELTA: f32 = 0.25;

fn battlefield() -> Battlefield {
    Battlefield::new(CommanderConfig::default().map, 21)
}

/// Perceive, decide and apply one tick for `team`, then advance the world
fn tick(field: &mut Battlefield, commander: &mut BdiCommander, team: TeamId) -> Vec<Order> {
    let sightings = field.sightings(team);
    let orders = commander.process_tick(&field.view(team), sightings, DELTA);
    field.apply_orders(team, &orders);
    field.step(DELTA);
    orders
}

/// Tick without letting the world move
fn think(field: &mut Battlefield, commander: &mut BdiCommander, team: TeamId) -> Vec<Order> {
    let sightings = field.sightings(team);
    commander.process_tick(&field.view(team), sightings, DELTA)
}

#[test]
fn test_wounded_unit_retreats_to_nearest_camp() {
    let mut field = battlefield();
    field.spawn_camp(Some(BLUE), Vec2::new(-300.0, 0.0), 1000.0);
    field.spawn_camp(Some(BLUE), Vec2::new(600.0, 600.0), 1000.0);
    let hurt = field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(100.0, 0.0));
    field.set_health(hurt, 20.0);

    let mut commander = BdiCommander::new(CommanderConfig::default());
    let orders = think(&mut field, &mut commander, BLUE);

    assert_eq!(commander.current_desire(), Some(DesireKind::Survival));
    assert_eq!(commander.intention().map(|i| i.plan_name()), Some("retreat"));

    let retreat = orders
        .iter()
        .find(|o| o.unit == hurt)
        .map(|o| o.order_type.clone());
    let Some(OrderType::MoveTo(destination)) = retreat else {
        panic!("expected a move order for the wounded unit, got {:?}", orders);
    };
    assert!((destination.x + 300.0).abs() <= 40.0);
    assert!(destination.y.abs() <= 40.0);
}

#[test]
fn test_wounded_unit_without_camp_does_not_retreat() {
    let mut field = battlefield();
    let hurt = field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(100.0, 0.0));
    field.set_health(hurt, 20.0);

    let mut commander = BdiCommander::new(CommanderConfig::default());
    think(&mut field, &mut commander, BLUE);

    assert_eq!(commander.current_desire(), Some(DesireKind::Guard));
}

#[test]
fn test_guard_sweeps_every_two_seconds() {
    let mut field = battlefield();
    let rifle = field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::ZERO);
    let medic = field.spawn_unit(BLUE, UnitArchetype::Medic, Vec2::new(30.0, 0.0));

    let mut commander = BdiCommander::new(CommanderConfig::default());
    let mut sweeps = Vec::new();
    for index in 1..=32 {
        let orders = tick(&mut field, &mut commander, BLUE);
        assert_eq!(commander.current_desire(), Some(DesireKind::Guard));
        if orders.is_empty() {
            continue;
        }

        sweeps.push(index);
        assert_eq!(orders.len(), 2);
        for order in &orders {
            assert!(order.unit == rifle || order.unit == medic);
            let OrderType::Rotate(angle) = order.order_type else {
                panic!("guard only rotates, got {:?}", order);
            };
            assert!(angle.abs() <= std::f32::consts::FRAC_PI_2);
        }
    }
    assert_eq!(sweeps, vec![8, 16, 24, 32]);
}

#[test]
fn test_intention_times_out_after_ten_seconds() {
    let mut field = battlefield();
    field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::ZERO);
    let mut commander = BdiCommander::new(CommanderConfig::default());

    for _ in 0..39 {
        think(&mut field, &mut commander, BLUE);
    }
    assert_eq!(commander.current_desire(), Some(DesireKind::Guard));
    assert_eq!(commander.intention().map(|i| i.elapsed()), Some(9.75));

    // 40th tick reaches 10.0 s; the intention is dropped before it runs
    let orders = think(&mut field, &mut commander, BLUE);
    assert!(orders.is_empty());
    assert_eq!(commander.current_desire(), None);
    assert_eq!(commander.stats().timed_out, 1);

    // next deliberation picks Guard again
    think(&mut field, &mut commander, BLUE);
    assert_eq!(commander.current_desire(), Some(DesireKind::Guard));
    assert_eq!(commander.stats().adoptions.get(&DesireKind::Guard), Some(&2));
}

#[test]
fn test_irrelevant_intention_dropped_at_next_deliberation() {
    let mut field = battlefield();
    field.spawn_camp(Some(BLUE), Vec2::new(-300.0, 0.0), 1000.0);
    let hurt = field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(100.0, 0.0));
    field.set_health(hurt, 20.0);

    let mut commander = BdiCommander::new(CommanderConfig::default());
    think(&mut field, &mut commander, BLUE);
    assert_eq!(commander.current_desire(), Some(DesireKind::Survival));

    field.set_health(hurt, 100.0);
    for _ in 0..4 {
        think(&mut field, &mut commander, BLUE);
        assert_eq!(commander.current_desire(), Some(DesireKind::Survival));
    }

    // sixth tick is the next deliberation
    think(&mut field, &mut commander, BLUE);
    assert_eq!(commander.current_desire(), Some(DesireKind::Guard));
    assert_eq!(commander.stats().invalidated, 1);
    assert_eq!(commander.stats().deliberations, 2);
}

#[test]
fn test_enemy_commander_draws_attack() {
    let mut field = battlefield();
    for y in [-10.0, 0.0, 10.0] {
        field.spawn_unit(BLUE, UnitArchetype::Rifleman, Vec2::new(0.0, y));
    }
    field.spawn_unit(RED, UnitArchetype::Commander, Vec2::new(150.0, 0.0));

    let mut commander = BdiCommander::new(CommanderConfig::default());
    think(&mut field, &mut commander, BLUE);

    let beliefs = commander.beliefs();
    assert!(beliefs.sees_enemy_commander);
    assert_eq!(beliefs.enemy_commander_position, Some(Vec2::new(150.0, 0.0)));
    // cell (9, 0) lies in region (2, 0)
    assert_eq!(beliefs.best_attack_target, Some(GridCoord::new(2, 0)));
    assert_eq!(commander.current_desire(), Some(DesireKind::Attack));

    let with_bonus = DesireKind::Attack.utility(beliefs);
    let mut unseen = beliefs.clone();
    unseen.sees_enemy_commander = false;
    let without = DesireKind::Attack.utility(&unseen);
    assert!((with_bonus - without - 30.0).abs() < 1e-4);
}

#[test]
fn test_sighted_camps_reported_once() {
    let mut field = battlefield();
    field.spawn_unit(BLUE, UnitArchetype::Scout, Vec2::ZERO);
    field.spawn_camp(Some(BLUE), Vec2::new(-500.0, 0.0), 1000.0);
    let outpost = field.spawn_camp(None, Vec2::new(100.0, 0.0), 400.0);

    let mut commander = BdiCommander::new(CommanderConfig::default());
    think(&mut field, &mut commander, BLUE);
    let first = commander.take_new_camps();
    assert_eq!(first.len(), 2);
    assert!(first.iter().any(|camp| camp.handle == outpost));

    think(&mut field, &mut commander, BLUE);
    assert!(commander.take_new_camps().is_empty());
}
