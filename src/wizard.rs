//! The wizard: a player-controlled platformer character.
//!
//! A wizard is a [`RigidBody`](crate::components::rigidbody::RigidBody)
//! driven by a [`StateMachine`] with five states:
//!
//! | State       | Forces                                   | Leaves when                          |
//! |-------------|------------------------------------------|--------------------------------------|
//! | `walking`   | walk move                                | not on ground → falling              |
//! |             |                                          | on ground long enough + jump → jumping |
//! |             |                                          | fire → push firing                   |
//! | `falling`   | gravity, air move                        | on ground → walking                  |
//! |             |                                          | crouch → dive_down                   |
//! |             |                                          | fire → push firing                   |
//! | `jumping`   | gravity, decaying jump impulse, walk move| duration over, jump released, or a collision after the grace time → falling |
//! |             |                                          | fire → push firing                   |
//! | `dive_down` | gravity, constant downforce              | on ground → walking                  |
//! | `firing`    | (spawns a bullet on entry)               | after `fire_duration` → pop          |
//!
//! Firing is pushed on top of whatever the wizard was doing, so the state
//! underneath keeps applying its forces while the shot goes off.

use glam::Vec2;

use crate::components::boxcollider::{Aabb, Shape};
use crate::components::signal::{Signal, SignalContext};
use crate::components::statemachine::{BehaviorContext, StateBehavior, StateMachine};
use crate::resources::entityregistry::SpawnRequest;
use crate::resources::gameconfig::PhysicsTuning;

/// Side of a bullet's square frame.
pub const BULLET_SIZE: f32 = 4.0;

/// Distance from the wizard's centre to the bullet's centre when fired.
const MUZZLE_DISTANCE: f32 = 16.0;

/// Sprite frame and collision box; sprites face left.
pub fn wizard_shape() -> Shape {
    Shape::new(Vec2::splat(16.0), Aabb::from_xywh(2.0, 2.0, 10.0, 14.0))
}

pub fn bullet_shape() -> Shape {
    Shape::square(BULLET_SIZE)
}

fn on_ground(ctx: &SignalContext) -> bool {
    ctx.body.last_collision.stands_on_ground
}

fn not_on_ground(ctx: &SignalContext) -> bool {
    !ctx.body.last_collision.stands_on_ground
}

fn was_collision(ctx: &SignalContext) -> bool {
    ctx.body.last_collision.was_collision
}

fn jump_pressed(ctx: &SignalContext) -> bool {
    ctx.controls.jump
}

fn jump_released(ctx: &SignalContext) -> bool {
    !ctx.controls.jump
}

fn fire_pressed(ctx: &SignalContext) -> bool {
    ctx.controls.fire
}

fn crouch_pressed(ctx: &SignalContext) -> bool {
    ctx.controls.crouch
}

/// Horizontal movement from left/right; also turns the wizard.
fn move_component(ctx: &mut BehaviorContext, speed: f32) {
    let direction = match (ctx.controls.left, ctx.controls.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => return,
    };
    ctx.body.look_at = Vec2::new(direction, 0.0);
    ctx.body
        .add_velocity_component("move", Vec2::new(direction * speed, 0.0), false);
}

fn gravity(ctx: &mut BehaviorContext) {
    let g = ctx.tuning.gravity;
    ctx.body.add_force("gravity", Vec2::new(0.0, g), false);
}

struct Walking;

impl StateBehavior for Walking {
    fn name(&self) -> &'static str {
        "walking"
    }

    fn update(&mut self, ctx: &mut BehaviorContext, _dt: f32) {
        let speed = ctx.tuning.walk_speed;
        move_component(ctx, speed);
    }
}

struct Falling;

impl StateBehavior for Falling {
    fn name(&self) -> &'static str {
        "falling"
    }

    fn update(&mut self, ctx: &mut BehaviorContext, _dt: f32) {
        gravity(ctx);
        let speed = ctx.tuning.air_speed;
        move_component(ctx, speed);
    }
}

#[derive(Default)]
struct Jumping {
    elapsed: f32,
}

impl StateBehavior for Jumping {
    fn name(&self) -> &'static str {
        "jumping"
    }

    fn on_enter(&mut self, _ctx: &mut BehaviorContext) {
        self.elapsed = 0.0;
    }

    fn update(&mut self, ctx: &mut BehaviorContext, dt: f32) {
        self.elapsed += dt;
        let force = ctx.tuning.jump_force;
        let duration = ctx.tuning.jump_duration.max(f32::EPSILON);
        let impulse = (force - self.elapsed * force / duration).max(0.0);
        gravity(ctx);
        ctx.body
            .add_velocity_component("jump", Vec2::new(0.0, -impulse), false);
        let speed = ctx.tuning.walk_speed;
        move_component(ctx, speed);
    }
}

struct DiveDown;

impl StateBehavior for DiveDown {
    fn name(&self) -> &'static str {
        "dive_down"
    }

    fn update(&mut self, ctx: &mut BehaviorContext, _dt: f32) {
        gravity(ctx);
        let speed = ctx.tuning.dive_speed;
        ctx.body
            .add_velocity_component("downforce", Vec2::new(0.0, speed), false);
    }
}

struct Firing;

impl StateBehavior for Firing {
    fn name(&self) -> &'static str {
        "firing"
    }

    fn on_enter(&mut self, ctx: &mut BehaviorContext) {
        let look_at = ctx.body.look_at;
        let center = ctx.body.bounding_box.center() + look_at * MUZZLE_DISTANCE;
        ctx.spawns.push(SpawnRequest::Bullet {
            position: center - Vec2::splat(BULLET_SIZE * 0.5),
            velocity: look_at * ctx.tuning.bullet_speed,
            shooter: ctx.entity,
        });
    }

    fn update(&mut self, _ctx: &mut BehaviorContext, _dt: f32) {}
}

/// Build a wizard's behaviour graph. The wizard starts falling.
pub fn build_wizard_machine(tuning: &PhysicsTuning) -> Result<StateMachine, String> {
    let mut m = StateMachine::new(Box::new(Falling)).with_default_shape(wizard_shape());
    let falling = m.active();
    let walking = m.add_state(Box::new(Walking));
    let jumping = m.add_state(Box::new(Jumping::default()));
    let dive_down = m.add_state(Box::new(DiveDown));
    let firing = m.add_state(Box::new(Firing));

    let fire = || Signal::basic(fire_pressed);

    m.add_transition(walking, Signal::basic(not_on_ground), falling)?;
    m.add_transition(
        walking,
        Signal::delay(tuning.jump_ready_delay).and(Signal::basic(jump_pressed)),
        jumping,
    )?;
    m.add_push(walking, fire(), firing)?;

    m.add_transition(falling, Signal::basic(on_ground), walking)?;
    m.add_transition(falling, Signal::basic(crouch_pressed), dive_down)?;
    m.add_push(falling, fire(), firing)?;

    let jump_ends = Signal::any3(
        Signal::delay(tuning.jump_duration),
        Signal::basic(jump_released),
        Signal::delay(tuning.landing_grace).and(Signal::basic(was_collision)),
    );
    m.add_transition(jumping, jump_ends, falling)?;
    m.add_push(jumping, fire(), firing)?;

    m.add_transition(dive_down, Signal::basic(on_ground), walking)?;

    m.add_pop(firing, Signal::delay(tuning.fire_duration))?;

    Ok(m)
}
