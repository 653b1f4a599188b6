//! Wizard behaviour integration tests: state change events, scripted and
//! random input, and whole matches on the bundled map.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use aberredplatformer::components::lifecycle::{Dead, Player};
use aberredplatformer::components::rigidbody::RigidBody;
use aberredplatformer::components::statemachine::{StackOp, StateMachine};
use aberredplatformer::events::statechange::StateChangeEvent;
use aberredplatformer::game::{build_schedule, build_world, run_tick};
use aberredplatformer::resources::gameconfig::GameConfig;
use aberredplatformer::resources::input::{InputBot, InputScript, InputSource};
use aberredplatformer::resources::scoreboard::Scoreboard;
use aberredplatformer::resources::tilemap::{TileMap, TileSet};
use aberredplatformer::systems::render::world_frame;

const DT: f32 = 1.0 / 60.0;

#[derive(Resource, Default)]
struct Changes(Vec<StateChangeEvent>);

fn record_change(trigger: On<StateChangeEvent>, mut changes: ResMut<Changes>) {
    changes.0.push(trigger.event().clone());
}

fn scripted(json: &str) -> InputSource {
    InputSource::Script(InputScript::from_json_str(json).unwrap())
}

fn world_with(rows: &[&str], input: InputSource) -> (World, Schedule) {
    let map = TileMap::from_rows(rows, TileSet::standard()).unwrap();
    let mut world = build_world(GameConfig::new(), map, input).unwrap();
    world.init_resource::<Changes>();
    world.add_observer(record_change);
    (world, build_schedule())
}

fn run(world: &mut World, schedule: &mut Schedule, ticks: usize) {
    for _ in 0..ticks {
        run_tick(world, schedule, DT);
    }
}

fn wizard(world: &mut World, index: u8) -> (Entity, RigidBody, Vec<&'static str>) {
    let mut q = world.query_filtered::<(Entity, &Player, &RigidBody, &StateMachine), Without<Dead>>();
    q.iter(world)
        .find(|(_, p, ..)| p.index == index)
        .map(|(e, _, b, m)| (e, b.clone(), m.stack_names()))
        .unwrap()
}

fn changes_of(world: &World, entity: Entity) -> Vec<(StackOp, &'static str, &'static str)> {
    world
        .resource::<Changes>()
        .0
        .iter()
        .filter(|c| c.entity == entity)
        .map(|c| (c.op, c.from, c.to))
        .collect()
}

// ==================== STATE CHANGE EVENTS ====================

#[test]
fn test_landing_is_reported_on_the_second_tick() {
    let (mut world, mut schedule) = world_with(&["   ", " 1 ", "###"], InputSource::Idle);
    let (entity, ..) = wizard(&mut world, 1);

    run(&mut world, &mut schedule, 5);

    let changes = &world.resource::<Changes>().0;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].entity, entity);
    assert_eq!(changes[0].op, StackOp::Transition);
    assert_eq!((changes[0].from, changes[0].to), ("falling", "walking"));
    assert_eq!(changes[0].frame, 2);
}

#[test]
fn test_fire_pushes_then_pops_back_to_the_state_underneath() {
    let (mut world, mut schedule) = world_with(
        &["   ", " 1 ", "###"],
        scripted(r#"{ "players": [ { "player": 1, "segments": [ { "from": 0, "to": 1, "keys": ["fire"] } ] } ] }"#),
    );
    let (entity, ..) = wizard(&mut world, 1);

    run(&mut world, &mut schedule, 2);
    assert_eq!(wizard(&mut world, 1).2, vec!["falling", "firing"]);

    run(&mut world, &mut schedule, 30);
    assert_eq!(
        changes_of(&world, entity),
        vec![
            (StackOp::Push, "falling", "firing"),
            (StackOp::Pop, "firing", "falling"),
            (StackOp::Transition, "falling", "walking"),
        ]
    );
    assert_eq!(wizard(&mut world, 1).2, vec!["walking"]);
}

#[test]
fn test_held_jump_lifts_the_wizard_off_the_floor() {
    let (mut world, mut schedule) = world_with(
        &["   ", "   ", "   ", "   ", "   ", "   ", " 1 ", "###"],
        scripted(r#"{ "players": [ { "player": 1, "segments": [ { "from": 0, "to": 200, "keys": ["jump"] } ] } ] }"#),
    );
    let (entity, start, _) = wizard(&mut world, 1);

    // land, wait out the jump-ready delay, then take off
    run(&mut world, &mut schedule, 20);

    let (_, body, stack) = wizard(&mut world, 1);
    assert!(body.position.y < start.position.y);
    assert_eq!(stack, vec!["jumping"]);
    assert!(
        changes_of(&world, entity).contains(&(StackOp::Transition, "walking", "jumping"))
    );
}

#[test]
fn test_pressing_left_turns_and_moves_the_wizard() {
    let (mut world, mut schedule) = world_with(
        &["          ", " 1        ", "##########"],
        scripted(r#"{ "players": [ { "player": 1, "segments": [ { "from": 0, "to": 30, "keys": ["left"] } ] } ] }"#),
    );
    let (_, start, _) = wizard(&mut world, 1);

    run(&mut world, &mut schedule, 10);

    let (_, body, stack) = wizard(&mut world, 1);
    assert_eq!(stack, vec!["walking"]);
    assert_eq!(body.look_at.x, -1.0);
    assert!(body.position.x < start.position.x);
    // stopped by the map edge, never pushed out of it
    assert!(body.bounding_box.min.x >= 0.0);
}

// ==================== WHOLE MATCHES ====================

#[test]
fn test_bot_matches_are_repeatable() {
    let rows = [
        "############",
        "#          #",
        "# 1      2 #",
        "#(==)  (==)#",
        "#          #",
        "############",
    ];
    let play = || {
        let (mut world, mut schedule) = world_with(&rows, InputSource::Bot(InputBot::new(1234)));
        run(&mut world, &mut schedule, 300);
        let standings = world.resource::<Scoreboard>().standings();
        let positions = (wizard(&mut world, 1).1.position, wizard(&mut world, 2).1.position);
        (standings, positions, world_frame(&mut world))
    };
    assert_eq!(play(), play());
}

#[test]
fn test_bundled_assets_load_and_run() {
    let root = env!("CARGO_MANIFEST_DIR");
    let tiles = TileSet::load(format!("{root}/assets/tiles.json")).unwrap();
    let map = TileMap::load(format!("{root}/assets/maps/arena.txt"), tiles, false).unwrap();
    let input = InputScript::load(format!("{root}/assets/input/demo.json")).unwrap();
    let mut config = GameConfig::with_path(format!("{root}/config.ini"));
    config.load_from_file().unwrap();

    let mut world = build_world(config, map, InputSource::Script(input)).unwrap();
    let mut schedule = build_schedule();
    run(&mut world, &mut schedule, 240);

    let frame = world_frame(&mut world);
    assert_eq!(frame.lines().count(), 10);
    assert!(frame.lines().all(|l| l.chars().count() == 20));
    assert_eq!(world.resource::<Scoreboard>().standings().len(), 2);
}
