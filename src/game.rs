//! Match setup and the tick driver.
//!
//! [`build_world`] turns a loaded map into a ready-to-run [`World`]: it
//! inserts the resources, registers the default observers and spawns a
//! wizard for every player marker and a spike for every spike marker, in
//! row-major map order (which is also their processing order).
//!
//! [`build_schedule`] returns the fixed per-tick system chain and
//! [`run_tick`] advances the clock and runs it once.
//!
//! # Map markers
//!
//! | Char    | Spawns                                  |
//! |---------|-----------------------------------------|
//! | `1`-`9` | wizard for that player, and its respawn point |
//! | `^`     | spike standing on the floor             |
//! | `v`     | spike hanging from the ceiling          |

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, info};

use crate::components::boxcollider::{Aabb, Shape};
use crate::components::controls::Controls;
use crate::components::lifecycle::{Hazard, Player, Projectile};
use crate::components::rigidbody::RigidBody;
use crate::events::kill::log_kill;
use crate::events::statechange::log_state_change;
use crate::resources::entityregistry::EntityRegistry;
use crate::resources::gameconfig::{GameConfig, PhysicsTuning};
use crate::resources::input::InputSource;
use crate::resources::scoreboard::Scoreboard;
use crate::resources::tilemap::TileMap;
use crate::resources::worldtime::WorldTime;
use crate::systems::input::apply_input;
use crate::systems::lifecycle::{award_kills, despawn_dead};
use crate::systems::simulation::simulation_tick;
use crate::systems::time::update_world_time;
use crate::wizard::{build_wizard_machine, bullet_shape, wizard_shape};

/// Map characters that spawn entities rather than name tiles.
pub const MARKERS: [char; 11] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '^', 'v'];

/// Spawn a wizard for `player` with its frame's top-left at `position`.
pub fn spawn_wizard(
    commands: &mut Commands,
    registry: &mut EntityRegistry,
    tuning: &PhysicsTuning,
    player: u8,
    position: Vec2,
) -> Result<Entity, String> {
    let machine = build_wizard_machine(tuning)?;
    let body = RigidBody::with_shape(position, wizard_shape());
    let entity = commands
        .spawn((
            registry.next_order(),
            body,
            machine,
            Controls::default(),
            Player { index: player },
        ))
        .id();
    debug!("Spawned wizard {} at {:?} as {:?}", player, position, entity);
    Ok(entity)
}

/// Spawn a bullet flying at constant `velocity`.
pub fn spawn_bullet(
    commands: &mut Commands,
    registry: &mut EntityRegistry,
    position: Vec2,
    velocity: Vec2,
    shooter: Entity,
) -> Entity {
    let shape = bullet_shape();
    let mut body = RigidBody::with_shape(position, shape);
    body.add_velocity_component("velocity", velocity, true);
    let entity = commands
        .spawn((registry.next_order(), body, shape, Projectile { shooter }))
        .id();
    debug!("Spawned bullet at {:?} moving {:?}", position, velocity);
    entity
}

/// Collision shape of a spike in its cell.
pub fn spike_shape(hanging: bool) -> Shape {
    let y = if hanging { 0.0 } else { 8.0 };
    Shape::new(Vec2::splat(16.0), Aabb::from_xywh(2.0, y, 12.0, 8.0))
}

/// Spawn a static spike occupying the cell at `position`.
pub fn spawn_spike(
    commands: &mut Commands,
    registry: &mut EntityRegistry,
    position: Vec2,
    hanging: bool,
) -> Entity {
    let shape = spike_shape(hanging);
    let mut body = RigidBody::with_shape(position, shape);
    body.freeze();
    commands
        .spawn((registry.next_order(), body, shape, Hazard))
        .id()
}

/// Build a world ready for [`run_tick`].
pub fn build_world(config: GameConfig, map: TileMap, input: InputSource) -> Result<World, String> {
    let mut world = World::new();
    let mut registry = EntityRegistry::new();
    let mut scoreboard = Scoreboard::new();

    world.add_observer(log_state_change);
    world.add_observer(log_kill);

    {
        let mut commands = world.commands();
        for (marker, position) in map.find_markers(&MARKERS) {
            match marker {
                '^' => {
                    spawn_spike(&mut commands, &mut registry, position, false);
                }
                'v' => {
                    spawn_spike(&mut commands, &mut registry, position, true);
                }
                digit => {
                    let player = digit.to_digit(10).unwrap_or(0) as u8;
                    spawn_wizard(&mut commands, &mut registry, &config.physics, player, position)?;
                    scoreboard.add_player(player, position);
                }
            }
        }
    }
    world.flush();

    info!(
        "Match ready: {} players, {} entities, collision {:?}",
        scoreboard.standings().len(),
        registry.spawned(),
        config.collision
    );

    world.insert_resource(WorldTime::default());
    world.insert_resource(config);
    world.insert_resource(map);
    world.insert_resource(registry);
    world.insert_resource(scoreboard);
    world.insert_resource(input);
    Ok(world)
}

/// The fixed per-tick system chain.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((despawn_dead, apply_input, simulation_tick, award_kills).chain());
    schedule
}

/// Advance the clock by `dt` seconds and run one tick.
pub fn run_tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
    world.clear_trackers();
}
