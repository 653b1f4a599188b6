//! The per-tick simulation step.
//!
//! [`simulation_tick`] advances every live body exactly once per tick, in
//! ascending [`SpawnOrder`]. For each entity:
//!
//! 1. If it has a [`StateMachine`], the machine ticks (passive states, then
//!    the top state and its signals). Fired stack operations are reported
//!    as [`StateChangeEvent`]s.
//! 2. Its [`RigidBody`] integrates its force slots and asks the configured
//!    resolver where it may go. Other bodies are seen at their positions
//!    *as of this moment in the tick*: entities earlier in the order have
//!    already moved.
//! 3. Kill rules run on the fresh collision result: a bullet that hit
//!    anything dies and kills any wizard among the hit entities; a wizard
//!    that touched a hazard dies. A dead wizard leaves the obstacle set at
//!    once, so bodies later in the order pass through it.
//!
//! Spawns requested by behaviour states (bullets) and deaths are applied
//! through [`Commands`], so the set of entities never changes mid-tick.
//!
//! # System Ordering
//!
//! Runs after [`apply_input`](crate::systems::input::apply_input) and before
//! [`award_kills`](crate::systems::lifecycle::award_kills).

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use rustc_hash::FxHashSet;

use crate::components::boxcollider::Shape;
use crate::components::controls::Controls;
use crate::components::lifecycle::{Dead, Hazard, Player, Projectile, SpawnOrder};
use crate::components::rigidbody::{RigidBody, ShapeProvider};
use crate::components::statemachine::{BehaviorContext, StateMachine, TickOutcome};
use crate::events::kill::{KillCause, KillEvent};
use crate::events::statechange::StateChangeEvent;
use crate::game::spawn_bullet;
use crate::physics::{CollisionResolver, Mover, Obstacle, SweepResolver};
use crate::resources::entityregistry::{EntityRegistry, SpawnRequest};
use crate::resources::gameconfig::{CollisionAlgorithm, GameConfig};
use crate::resources::tilemap::TileMap;
use crate::resources::worldtime::WorldTime;

/// Resources the simulation step reads or writes besides the bodies.
#[derive(SystemParam)]
pub struct SimulationContext<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub time: Res<'w, WorldTime>,
    pub config: Res<'w, GameConfig>,
    pub map: Res<'w, TileMap>,
    pub registry: ResMut<'w, EntityRegistry>,
}

type SimulatedQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static SpawnOrder,
        &'static mut RigidBody,
        Option<&'static mut StateMachine>,
        Option<&'static Shape>,
        Option<&'static Controls>,
        Option<&'static Projectile>,
    ),
    Without<Dead>,
>;

/// Advance every live body by one tick in spawn order.
pub fn simulation_tick(
    mut bodies: SimulatedQuery,
    players: Query<(), (With<Player>, Without<Dead>)>,
    hazards: Query<(), With<Hazard>>,
    mut ctx: SimulationContext,
) {
    let dt = ctx.time.delta;
    let frame = ctx.time.frame_count;
    let tuning = ctx.config.physics;
    let idle = Controls::default();

    let mut order: Vec<(SpawnOrder, Entity)> =
        bodies.iter().map(|(entity, order, ..)| (*order, entity)).collect();
    order.sort_unstable();

    // bullets pass through each other and never block wizards
    let mut obstacles: Vec<Obstacle> = order
        .iter()
        .filter_map(|(_, entity)| {
            let (_, _, body, _, _, _, projectile) = bodies.get(*entity).ok()?;
            projectile.is_none().then_some(Obstacle {
                entity: *entity,
                aabb: body.bounding_box,
            })
        })
        .collect();

    let mut killed: FxHashSet<Entity> = FxHashSet::default();
    let mut spawns: Vec<SpawnRequest> = Vec::new();

    for (_, entity) in order {
        if killed.contains(&entity) {
            continue;
        }
        let Ok((_, _, mut body, mut machine, shape, controls, projectile)) =
            bodies.get_mut(entity)
        else {
            continue;
        };

        if let Some(machine) = machine.as_deref_mut() {
            let mut behavior = BehaviorContext {
                entity,
                body: &mut body,
                controls: controls.unwrap_or(&idle),
                tuning: &tuning,
                spawns: &mut spawns,
            };
            if let TickOutcome::Fired { op, from, to } = machine.tick(&mut behavior, dt, frame) {
                ctx.commands.trigger(StateChangeEvent {
                    entity,
                    op,
                    from,
                    to,
                    frame,
                });
            }
        }

        let fallback = Shape::default();
        let shapes: &dyn ShapeProvider = match (machine.as_deref(), shape) {
            (Some(machine), _) => machine,
            (None, Some(shape)) => shape,
            (None, None) => &fallback,
        };

        {
            let snap;
            let sweep;
            let mover: &dyn Mover = match ctx.config.collision {
                CollisionAlgorithm::Snap => {
                    snap = CollisionResolver::new(&*ctx.map, &obstacles).excluding(entity);
                    &snap
                }
                CollisionAlgorithm::Sweep => {
                    sweep = SweepResolver::new(&*ctx.map, &obstacles)
                        .excluding(entity)
                        .with_max_iterations(ctx.config.sweep_iterations);
                    &sweep
                }
            };
            body.update(dt, shapes, mover);
        }

        if let Some(o) = obstacles.iter_mut().find(|o| o.entity == entity) {
            o.aabb = body.bounding_box;
        }

        let hit = &body.last_collision;
        if let Some(projectile) = projectile {
            if hit.was_collision {
                killed.insert(entity);
                ctx.commands.entity(entity).insert(Dead);
                for victim in hit.colliding_entities.iter().copied() {
                    if players.contains(victim) && killed.insert(victim) {
                        obstacles.retain(|o| o.entity != victim);
                        ctx.commands.entity(victim).insert(Dead);
                        ctx.commands.trigger(KillEvent {
                            victim,
                            killer: Some(projectile.shooter),
                            cause: KillCause::Bullet,
                            frame,
                        });
                    }
                }
            }
        } else if players.contains(entity)
            && hit.colliding_entities.iter().any(|e| hazards.contains(*e))
        {
            killed.insert(entity);
            obstacles.retain(|o| o.entity != entity);
            ctx.commands.entity(entity).insert(Dead);
            ctx.commands.trigger(KillEvent {
                victim: entity,
                killer: None,
                cause: KillCause::Hazard,
                frame,
            });
        }
    }

    for request in spawns {
        match request {
            SpawnRequest::Bullet {
                position,
                velocity,
                shooter,
            } => {
                spawn_bullet(&mut ctx.commands, &mut ctx.registry, position, velocity, shooter);
            }
        }
    }
}
