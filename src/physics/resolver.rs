//! Axis-separated snap resolver.
//!
//! A move is resolved one axis at a time so a body can slide along floors
//! and walls:
//!
//! 1. **Vertical** – the body's box at `(x, target.y)` is tested against
//!    solid tiles under its four corners, then against other bodies. On the
//!    first hit the leading edge (bottom when moving down, top when moving
//!    up) is snapped to the obstacle's opposite edge.
//! 2. **Horizontal** – the same test at `(target.x, corrected y)`.
//! 3. **Ground probe** – the resolved box shifted one unit down; any hit
//!    means the body stands on something.
//!
//! Bodies hit in either pass are reported in
//! [`CollisionResult::colliding_entities`]; tiles block but are not reported.

use bevy_ecs::prelude::Entity;
use glam::Vec2;

use crate::components::boxcollider::Aabb;
use crate::components::rigidbody::RigidBody;
use crate::physics::{CollisionResult, Mover, Obstacle, TileLookup, clamp_into, solid_cell_at};

pub struct CollisionResolver<'a, T: TileLookup> {
    tiles: &'a T,
    obstacles: &'a [Obstacle],
    ignore: Option<Entity>,
}

impl<'a, T: TileLookup> CollisionResolver<'a, T> {
    pub fn new(tiles: &'a T, obstacles: &'a [Obstacle]) -> Self {
        Self {
            tiles,
            obstacles,
            ignore: None,
        }
    }

    /// Skip the moving body's own entry in the obstacle list.
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.ignore = Some(entity);
        self
    }

    /// First obstacle overlapping `probe`: tiles under its corners first,
    /// then bodies in obstacle-list order.
    fn first_hit(&self, probe: &Aabb) -> Option<(Aabb, Option<Entity>)> {
        for corner in probe.corners() {
            if let Some(cell) = solid_cell_at(self.tiles, corner) {
                if probe.intersects(&cell) {
                    return Some((cell, None));
                }
            }
        }
        self.obstacles
            .iter()
            .filter(|o| Some(o.entity) != self.ignore)
            .find(|o| probe.intersects(&o.aabb))
            .map(|o| (o.aabb, Some(o.entity)))
    }

    /// Resolve a move of a box `local` (relative to the position) from
    /// `start` to `target`.
    pub fn resolve(&self, local: &Aabb, start: Vec2, target: Vec2) -> CollisionResult {
        let mut result = CollisionResult::default();
        let mut pos = Vec2::new(start.x, target.y);

        let vertical = local.translated(pos);
        if let Some((hit, entity)) = self.first_hit(&vertical) {
            result.was_collision = true;
            if let Some(entity) = entity {
                result.record(entity);
            }
            pos.y = if leads_with_max(target.y - start.y, vertical.center().y, hit.center().y) {
                hit.min.y - local.max.y
            } else {
                hit.max.y - local.min.y
            };
        }

        pos.x = target.x;
        let horizontal = local.translated(pos);
        if let Some((hit, entity)) = self.first_hit(&horizontal) {
            result.was_collision = true;
            if let Some(entity) = entity {
                result.record(entity);
            }
            pos.x = if leads_with_max(target.x - start.x, horizontal.center().x, hit.center().x) {
                hit.min.x - local.max.x
            } else {
                hit.max.x - local.min.x
            };
        }

        pos = clamp_into(&self.tiles.bounds(), local, pos);

        let probe = local.translated(pos + Vec2::Y);
        result.stands_on_ground = self.first_hit(&probe).is_some();
        result.available_position = pos;
        result
    }
}

/// Whether the moving box meets the obstacle with its max edge.
///
/// Follows the direction of travel; without movement on this axis the box
/// is pushed out on the side its centre is on.
fn leads_with_max(delta: f32, center: f32, obstacle_center: f32) -> bool {
    if delta > 0.0 {
        true
    } else if delta < 0.0 {
        false
    } else {
        center < obstacle_center
    }
}

impl<T: TileLookup> Mover for CollisionResolver<'_, T> {
    fn move_body(&self, body: &RigidBody, target: Vec2) -> Option<CollisionResult> {
        let local = body.shape.collision_box;
        Some(self.resolve(&local, body.position, target))
    }
}
