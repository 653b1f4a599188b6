//! Kinematic body component with named force slots.
//!
//! The [`RigidBody`] component stores an entity's position, facing and an
//! insertion-ordered list of named [`ForceSlot`]s. Behaviour code re-specifies
//! the forces it wants every tick:
//!
//! - [`RigidBody::add_force`] sets a slot's acceleration for this tick only
//! - [`RigidBody::add_velocity_component`] sets a slot's velocity; unless the
//!   slot is constant it is cleared again at the end of the tick
//!
//! [`RigidBody::update`] integrates the slots, asks a
//! [`Mover`](crate::physics::Mover) where the body may go, commits the answer
//! and applies the reset policy:
//!
//! - acceleration is always cleared
//! - velocity is cleared when the tick ended in a collision, or when the slot
//!   is a non-constant velocity component
//!
//! A collision clears every slot's velocity, constant ones included, so a
//! body that keeps re-adding a constant push cannot embed itself in a wall.
//!
//! A zero `dt` applies the same reset policy without moving the body or
//! consulting the mover.
//!
//! The `frozen` flag turns the body into a static obstacle: its bounding box
//! follows its shape but it never integrates or moves.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use smallvec::SmallVec;

use crate::components::boxcollider::{Aabb, Shape};
use crate::physics::{CollisionResult, Mover};

/// Supplies the collision shape a body should use this tick.
pub trait ShapeProvider {
    fn current_shape(&self) -> Shape;
}

impl ShapeProvider for Shape {
    fn current_shape(&self) -> Shape {
        *self
    }
}

/// A named acceleration/velocity accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceSlot {
    pub name: String,
    /// Acceleration in world units per tick per second.
    pub acceleration: Vec2,
    /// Velocity in world units per tick.
    pub velocity: Vec2,
    pub is_velocity_component: bool,
    pub is_constant: bool,
}

impl ForceSlot {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            acceleration: Vec2::ZERO,
            velocity: Vec2::ZERO,
            is_velocity_component: false,
            is_constant: false,
        }
    }
}

#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    pub position: Vec2,
    /// Facing direction, `(-1, 0)` or `(1, 0)` for walkers.
    pub look_at: Vec2,
    /// Oriented shape from the last refresh.
    pub shape: Shape,
    /// World-space collision box at `position`.
    pub bounding_box: Aabb,
    pub last_collision: CollisionResult,
    /// Candidate position minus old position, from the last update.
    pub displacement: Vec2,
    /// When true, `update` only refreshes the bounding box.
    pub frozen: bool,
    slots: SmallVec<[ForceSlot; 4]>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl RigidBody {
    pub fn new(position: Vec2) -> Self {
        let shape = Shape::default();
        Self {
            position,
            look_at: Vec2::new(1.0, 0.0),
            shape,
            bounding_box: shape.bounding_box(position),
            last_collision: CollisionResult::at(position),
            displacement: Vec2::ZERO,
            frozen: false,
            slots: SmallVec::new(),
        }
    }

    /// Create a body that starts with the given shape already applied.
    pub fn with_shape(position: Vec2, shape: Shape) -> Self {
        let mut body = Self::new(position);
        body.apply_shape(shape);
        body
    }

    fn slot_mut(&mut self, name: &str) -> &mut ForceSlot {
        let index = match self.slots.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.slots.push(ForceSlot::new(name));
                self.slots.len() - 1
            }
        };
        &mut self.slots[index]
    }

    /// Set (or overwrite) a named acceleration for this tick.
    pub fn add_force(&mut self, name: &str, acceleration: Vec2, is_constant: bool) {
        let slot = self.slot_mut(name);
        slot.acceleration = acceleration;
        slot.is_constant = is_constant;
    }

    /// Set (or overwrite) a named velocity component.
    pub fn add_velocity_component(&mut self, name: &str, velocity: Vec2, is_constant: bool) {
        let slot = self.slot_mut(name);
        slot.velocity = velocity;
        slot.is_velocity_component = true;
        slot.is_constant = is_constant;
    }

    /// Remove a named slot entirely.
    pub fn remove_force(&mut self, name: &str) {
        self.slots.retain(|s| s.name != name);
    }

    pub fn slot(&self, name: &str) -> Option<&ForceSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// All slots in the order they were first added.
    pub fn slots(&self) -> &[ForceSlot] {
        &self.slots
    }

    /// Sum of every slot's velocity.
    pub fn velocity(&self) -> Vec2 {
        self.slots.iter().map(|s| s.velocity).sum()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    fn apply_shape(&mut self, shape: Shape) {
        self.shape = shape.oriented(self.look_at);
        self.bounding_box = self.shape.bounding_box(self.position);
    }

    /// Query the shape provider and recompute the bounding box.
    pub fn refresh_shape(&mut self, shapes: &dyn ShapeProvider) {
        self.apply_shape(shapes.current_shape());
    }

    /// Advance the body by one tick.
    ///
    /// A zero `dt` never moves the body, but the tick's forces still expire:
    /// accelerations and non-constant velocity components are cleared.
    pub fn update(
        &mut self,
        dt: f32,
        shapes: &dyn ShapeProvider,
        mover: &dyn Mover,
    ) -> &CollisionResult {
        self.refresh_shape(shapes);
        if self.frozen {
            return &self.last_collision;
        }
        if dt == 0.0 {
            // no move was attempted, so an old collision clears nothing
            self.reset_slots(false);
            return &self.last_collision;
        }

        let mut candidate = self.position;
        for slot in self.slots.iter_mut() {
            slot.velocity += slot.acceleration * dt;
            candidate += slot.velocity;
        }
        self.displacement = candidate - self.position;

        if let Some(result) = mover.move_body(self, candidate) {
            self.position = result.available_position;
            self.last_collision = result;
        }

        self.reset_slots(self.last_collision.was_collision);
        self.bounding_box = self.shape.bounding_box(self.position);
        &self.last_collision
    }

    fn reset_slots(&mut self, collided: bool) {
        for slot in self.slots.iter_mut() {
            slot.acceleration = Vec2::ZERO;
            if collided || (slot.is_velocity_component && !slot.is_constant) {
                slot.velocity = Vec2::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Accepts every move.
    struct OpenSpace;

    impl Mover for OpenSpace {
        fn move_body(&self, _body: &RigidBody, target: Vec2) -> Option<CollisionResult> {
            Some(CollisionResult::at(target))
        }
    }

    /// Rejects every move with a collision.
    struct Wall;

    impl Mover for Wall {
        fn move_body(&self, body: &RigidBody, _target: Vec2) -> Option<CollisionResult> {
            Some(CollisionResult {
                was_collision: true,
                ..CollisionResult::at(body.position)
            })
        }
    }

    /// Never answers.
    struct Silent;

    impl Mover for Silent {
        fn move_body(&self, _body: &RigidBody, _target: Vec2) -> Option<CollisionResult> {
            None
        }
    }

    // ==================== FORCE SLOT TESTS ====================

    #[test]
    fn test_add_force_overwrites_same_slot() {
        let mut rb = RigidBody::default();
        rb.add_force("g", Vec2::new(0.0, 1.0), false);
        rb.add_force("g", Vec2::new(0.0, 2.0), false);
        assert_eq!(rb.slots().len(), 1);
        assert!(approx_eq(rb.slot("g").unwrap().acceleration.y, 2.0));
    }

    #[test]
    fn test_slots_keep_insertion_order() {
        let mut rb = RigidBody::default();
        rb.add_force("g", Vec2::Y, false);
        rb.add_velocity_component("move", Vec2::X, false);
        rb.add_velocity_component("jump", -Vec2::Y, false);
        rb.add_force("g", Vec2::Y * 2.0, false);
        let names: Vec<&str> = rb.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["g", "move", "jump"]);
    }

    #[test]
    fn test_add_velocity_component_marks_slot() {
        let mut rb = RigidBody::default();
        rb.add_velocity_component("b", Vec2::new(3.0, 0.0), true);
        let slot = rb.slot("b").unwrap();
        assert!(slot.is_velocity_component);
        assert!(slot.is_constant);
        assert_eq!(slot.velocity, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_remove_force() {
        let mut rb = RigidBody::default();
        rb.add_force("g", Vec2::Y, false);
        rb.remove_force("g");
        rb.remove_force("missing");
        assert!(rb.slots().is_empty());
    }

    // ==================== INTEGRATION TESTS ====================

    #[test]
    fn test_free_fall_matches_closed_form_sum() {
        let dt = 1.0 / 60.0;
        let mut rb = RigidBody::new(Vec2::ZERO);
        let mut velocity = 0.0;
        let mut expected = 0.0;
        for _ in 0..120 {
            rb.add_force("g", Vec2::new(0.0, 3.5), false);
            let result = rb.update(dt, &Shape::default(), &OpenSpace);
            assert!(!result.was_collision);
            velocity += 3.5 * dt;
            expected += velocity;
        }
        assert!(approx_eq(rb.position.y, expected));
        assert!(approx_eq(rb.position.x, 0.0));
    }

    #[test]
    fn test_velocity_component_moves_per_tick_and_resets() {
        let mut rb = RigidBody::new(Vec2::ZERO);
        rb.add_velocity_component("move", Vec2::new(3.0, 0.0), false);
        rb.update(0.1, &Shape::default(), &OpenSpace);
        assert!(approx_eq(rb.position.x, 3.0));
        assert_eq!(rb.slot("move").unwrap().velocity, Vec2::ZERO);
        rb.update(0.1, &Shape::default(), &OpenSpace);
        assert!(approx_eq(rb.position.x, 3.0));
    }

    #[test]
    fn test_constant_velocity_survives_without_collision() {
        let mut rb = RigidBody::new(Vec2::ZERO);
        rb.add_velocity_component("b", Vec2::new(2.0, 0.0), true);
        rb.update(0.1, &Shape::default(), &OpenSpace);
        assert_eq!(rb.slot("b").unwrap().velocity, Vec2::new(2.0, 0.0));
        rb.update(0.1, &Shape::default(), &OpenSpace);
        assert!(approx_eq(rb.position.x, 4.0));
    }

    #[test]
    fn test_acceleration_is_always_cleared() {
        let mut rb = RigidBody::new(Vec2::ZERO);
        rb.add_force("g", Vec2::new(0.0, 10.0), true);
        rb.update(0.5, &Shape::default(), &OpenSpace);
        let slot = rb.slot("g").unwrap();
        assert_eq!(slot.acceleration, Vec2::ZERO);
        // plain forces keep their velocity
        assert!(approx_eq(slot.velocity.y, 5.0));
    }

    #[test]
    fn test_collision_clears_every_velocity_even_constant() {
        let mut rb = RigidBody::new(Vec2::ZERO);
        rb.add_velocity_component("b", Vec2::new(2.0, 0.0), true);
        rb.add_force("g", Vec2::new(0.0, 3.5), false);
        let result = rb.update(0.1, &Shape::default(), &Wall);
        assert!(result.was_collision);
        for slot in rb.slots() {
            assert_eq!(slot.velocity, Vec2::ZERO, "slot {} kept velocity", slot.name);
        }
        assert_eq!(rb.position, Vec2::ZERO);
    }

    #[test]
    fn test_zero_dt_never_moves() {
        let mut rb = RigidBody::new(Vec2::new(5.0, 5.0));
        rb.add_velocity_component("b", Vec2::new(2.0, 0.0), true);
        rb.add_force("g", Vec2::new(0.0, 3.5), false);
        rb.update(0.0, &Shape::default(), &OpenSpace);
        assert_eq!(rb.position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_zero_dt_still_expires_the_ticks_forces() {
        let mut rb = RigidBody::new(Vec2::ZERO);
        rb.add_force("kick", Vec2::new(0.0, 100.0), false);
        rb.add_velocity_component("dash", Vec2::new(5.0, 0.0), false);
        rb.add_velocity_component("belt", Vec2::new(1.0, 0.0), true);
        rb.update(0.0, &Shape::default(), &OpenSpace);

        assert_eq!(rb.slot("kick").unwrap().acceleration, Vec2::ZERO);
        assert_eq!(rb.slot("dash").unwrap().velocity, Vec2::ZERO);
        assert_eq!(rb.slot("belt").unwrap().velocity, Vec2::new(1.0, 0.0));

        // nothing re-added: only the constant slot carries into the next tick
        rb.update(0.1, &Shape::default(), &OpenSpace);
        assert!(approx_eq(rb.position.x, 1.0));
        assert!(approx_eq(rb.position.y, 0.0));
    }

    #[test]
    fn test_zero_dt_ignores_a_stale_collision() {
        let mut rb = RigidBody::new(Vec2::ZERO);
        rb.update(0.1, &Shape::default(), &Wall);
        assert!(rb.last_collision.was_collision);

        rb.add_velocity_component("belt", Vec2::new(1.0, 0.0), true);
        rb.update(0.0, &Shape::default(), &Wall);
        assert_eq!(rb.slot("belt").unwrap().velocity, Vec2::new(1.0, 0.0));
        assert_eq!(rb.position, Vec2::ZERO);
    }

    #[test]
    fn test_silent_mover_keeps_position_and_previous_result() {
        let mut rb = RigidBody::new(Vec2::new(1.0, 1.0));
        rb.add_velocity_component("b", Vec2::new(2.0, 0.0), true);
        rb.update(0.1, &Shape::default(), &Silent);
        assert_eq!(rb.position, Vec2::new(1.0, 1.0));
        assert!(!rb.last_collision.was_collision);
        assert_eq!(rb.displacement, Vec2::new(2.0, 0.0));
        // constant slot survives, previous result had no collision
        assert_eq!(rb.slot("b").unwrap().velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_frozen_body_only_refreshes_box() {
        let mut rb = RigidBody::new(Vec2::new(32.0, 32.0));
        rb.freeze();
        rb.add_velocity_component("b", Vec2::new(2.0, 0.0), true);
        rb.update(0.1, &Shape::square(8.0), &OpenSpace);
        assert_eq!(rb.position, Vec2::new(32.0, 32.0));
        assert_eq!(rb.bounding_box, Aabb::from_xywh(32.0, 32.0, 8.0, 8.0));
        rb.unfreeze();
        assert!(!rb.frozen);
    }

    #[test]
    fn test_bounding_box_follows_facing() {
        let shape = Shape::new(Vec2::splat(16.0), Aabb::from_xywh(2.0, 0.0, 10.0, 16.0));
        let mut rb = RigidBody::new(Vec2::new(100.0, 0.0));
        rb.look_at = Vec2::new(-1.0, 0.0);
        rb.refresh_shape(&shape);
        assert!(approx_eq(rb.bounding_box.min.x, 102.0));
        rb.look_at = Vec2::new(1.0, 0.0);
        rb.refresh_shape(&shape);
        assert!(approx_eq(rb.bounding_box.min.x, 104.0));
    }

    #[test]
    fn test_velocity_sums_slots() {
        let mut rb = RigidBody::default();
        rb.add_velocity_component("a", Vec2::new(1.0, 0.0), false);
        rb.add_velocity_component("b", Vec2::new(0.0, 2.0), false);
        assert_eq!(rb.velocity(), Vec2::new(1.0, 2.0));
    }
}
