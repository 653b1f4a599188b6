//! Bounded binary-search sweep.
//!
//! Cheaper per tile than the snap resolver but only approximate: the move is
//! tested at the target and, while any border pixel of the body overlaps a
//! solid tile or another body, the step towards the target is halved. After
//! `max_iterations` halvings the body stays where it started and the move is
//! reported as a collision.
//!
//! A body that already overlaps something at its start position is pushed
//! away from the offending pixel by the vector from that pixel to the body's
//! centre.

use bevy_ecs::prelude::Entity;
use glam::Vec2;

use crate::components::boxcollider::Shape;
use crate::components::rigidbody::RigidBody;
use crate::physics::{CollisionResult, Mover, Obstacle, TileLookup, clamp_into, solid_cell_at};

pub const DEFAULT_MAX_ITERATIONS: u32 = 4;

pub struct SweepResolver<'a, T: TileLookup> {
    tiles: &'a T,
    obstacles: &'a [Obstacle],
    ignore: Option<Entity>,
    max_iterations: u32,
}

/// A pixel found overlapping something.
struct PixelHit {
    point: Vec2,
    entity: Option<Entity>,
}

impl<'a, T: TileLookup> SweepResolver<'a, T> {
    pub fn new(tiles: &'a T, obstacles: &'a [Obstacle]) -> Self {
        Self {
            tiles,
            obstacles,
            ignore: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn excluding(mut self, entity: Entity) -> Self {
        self.ignore = Some(entity);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn blocked(&self, point: Vec2) -> Option<Option<Entity>> {
        if solid_cell_at(self.tiles, point).is_some_and(|cell| cell.contains(point)) {
            return Some(None);
        }
        self.obstacles
            .iter()
            .filter(|o| Some(o.entity) != self.ignore)
            .find(|o| o.aabb.contains(point))
            .map(|o| Some(o.entity))
    }

    fn first_overlap(&self, pixels: &[Vec2], position: Vec2) -> Option<PixelHit> {
        pixels.iter().find_map(|p| {
            let point = *p + position;
            self.blocked(point).map(|entity| PixelHit { point, entity })
        })
    }

    pub fn resolve(&self, shape: &Shape, start: Vec2, target: Vec2) -> CollisionResult {
        let mut result = CollisionResult::default();
        let pixels = shape.perimeter_pixels();
        let local = shape.collision_box;

        let mut pos = if let Some(hit) = self.first_overlap(&pixels, start) {
            result.was_collision = true;
            if let Some(entity) = hit.entity {
                result.record(entity);
            }
            let center = start + local.center();
            start + (center - hit.point)
        } else {
            let mut step = target - start;
            let mut pos = target;
            let mut iterations = 0;
            while let Some(hit) = self.first_overlap(&pixels, pos) {
                result.was_collision = true;
                if let Some(entity) = hit.entity {
                    result.record(entity);
                }
                if iterations >= self.max_iterations {
                    pos = start;
                    break;
                }
                step *= 0.5;
                pos = start + step;
                iterations += 1;
            }
            pos
        };

        pos = clamp_into(&self.tiles.bounds(), &local, pos);

        let bottom = local.translated(pos);
        let probes = [
            Vec2::new(bottom.min.x, bottom.max.y),
            Vec2::new(bottom.center().x, bottom.max.y),
            Vec2::new(bottom.max.x - 1.0, bottom.max.y),
        ];
        result.stands_on_ground = probes.iter().any(|p| self.blocked(*p).is_some());
        result.available_position = pos;
        result
    }
}

impl<T: TileLookup> Mover for SweepResolver<'_, T> {
    fn move_body(&self, body: &RigidBody, target: Vec2) -> Option<CollisionResult> {
        Some(self.resolve(&body.shape, body.position, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::boxcollider::Aabb;
    use crate::resources::tilemap::{TileMap, TileSet};
    use bevy_ecs::world::World;

    fn arena() -> TileMap {
        TileMap::from_rows(
            &[
                "        ",
                "        ",
                "        ",
                "   #    ",
                "########",
            ],
            TileSet::standard(),
        )
        .unwrap()
    }

    #[test]
    fn test_free_move_reaches_target() {
        let map = arena();
        let sweep = SweepResolver::new(&map, &[]);
        let r = sweep.resolve(&Shape::square(16.0), Vec2::new(8.0, 0.0), Vec2::new(10.0, 3.0));
        assert!(!r.was_collision);
        assert!(!r.stands_on_ground);
        assert_eq!(r.available_position, Vec2::new(10.0, 3.0));
    }

    #[test]
    fn test_collision_halves_step_until_clear() {
        let map = arena();
        let sweep = SweepResolver::new(&map, &[]);
        // target overlaps the floor, half way (y = 48) is exactly on top of it
        let r = sweep.resolve(&Shape::square(16.0), Vec2::new(8.0, 40.0), Vec2::new(8.0, 56.0));
        assert!(r.was_collision);
        assert_eq!(r.available_position, Vec2::new(8.0, 48.0));
        assert!(r.stands_on_ground);
    }

    #[test]
    fn test_iteration_cap_fails_soft_to_start() {
        let map = arena();
        let sweep = SweepResolver::new(&map, &[]);
        let r = sweep.resolve(&Shape::square(16.0), Vec2::new(8.0, 0.0), Vec2::new(8.0, 1000.0));
        assert!(r.was_collision);
        assert_eq!(r.available_position, Vec2::new(8.0, 0.0));
    }

    #[test]
    fn test_more_iterations_give_approximate_contact() {
        let map = arena();
        let sweep = SweepResolver::new(&map, &[]).with_max_iterations(6);
        let r = sweep.resolve(&Shape::square(16.0), Vec2::new(8.0, 0.0), Vec2::new(8.0, 1000.0));
        assert!(r.was_collision);
        // 1000 / 2^5; short of the floor contact at y = 48
        assert_eq!(r.available_position, Vec2::new(8.0, 31.25));
        assert!(!r.stands_on_ground);
    }

    #[test]
    fn test_unstick_pushes_away_from_overlapping_pixel() {
        let map = arena();
        let sweep = SweepResolver::new(&map, &[]);
        // bottom-left border pixel (8, 71) sits inside the floor
        let start = Vec2::new(8.0, 56.0);
        let r = sweep.resolve(&Shape::square(16.0), start, start);
        assert!(r.was_collision);
        assert_eq!(r.available_position, Vec2::new(16.0, 49.0));
    }

    #[test]
    fn test_bodies_block_and_are_recorded() {
        let mut world = World::new();
        let me = world.spawn_empty().id();
        let other = world.spawn_empty().id();
        let map = arena();
        let obstacles = [
            Obstacle {
                entity: me,
                aabb: Aabb::from_xywh(8.0, 0.0, 16.0, 16.0),
            },
            Obstacle {
                entity: other,
                aabb: Aabb::from_xywh(8.0, 40.0, 16.0, 16.0),
            },
        ];
        let sweep = SweepResolver::new(&map, &obstacles).excluding(me);
        let r = sweep.resolve(&Shape::square(16.0), Vec2::new(8.0, 0.0), Vec2::new(8.0, 30.0));
        assert!(r.was_collision);
        assert_eq!(r.available_position, Vec2::new(8.0, 15.0));
        assert_eq!(r.colliding_entities.as_slice(), &[other]);
    }

    #[test]
    fn test_mover_uses_oriented_body_shape() {
        let map = arena();
        let sweep = SweepResolver::new(&map, &[]);
        let body = RigidBody::with_shape(Vec2::new(8.0, 40.0), Shape::square(16.0));
        let r = sweep.move_body(&body, Vec2::new(8.0, 56.0)).unwrap();
        assert_eq!(r.available_position, Vec2::new(8.0, 48.0));
    }
}
