//! Collision resolution for kinematic platformer bodies.
//!
//! A [`RigidBody`](crate::components::rigidbody::RigidBody) proposes a new
//! position each tick and hands it to a [`Mover`], which answers with a
//! [`CollisionResult`]: where the body may actually go, whether anything was
//! hit, and whether the body ends up standing on something.
//!
//! Two movers are provided:
//! - [`resolver::CollisionResolver`] – axis-separated snap against solid
//!   tiles and other bodies, with an explicit ground probe (canonical)
//! - [`sweep::SweepResolver`] – bounded binary search between the old and
//!   the proposed position using per-pixel overlap against solid tiles
//!
//! The tile grid is read through [`TileLookup`] so the resolvers never
//! depend on how maps are stored or loaded.

pub mod resolver;
pub mod sweep;

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Entity;
use glam::{IVec2, Vec2};

use crate::components::boxcollider::Aabb;
use crate::components::rigidbody::RigidBody;
use crate::resources::tilemap::{CollisionType, TILE_SIZE, TileInfo};

pub use resolver::CollisionResolver;
pub use sweep::SweepResolver;

/// Tile grid access needed by the resolvers.
pub trait TileLookup {
    /// Character at a world position, `None` outside the map.
    fn char_at(&self, world: Vec2) -> Option<char>;
    /// Tile named by a map character, `None` for characters with no tile.
    fn tile_from_char(&self, ch: char) -> Option<&TileInfo>;
    /// World-space extent of the map.
    fn bounds(&self) -> Aabb;
}

/// Solid collision box of the cell containing `point`, in world space.
///
/// Cells outside the map are full solid cells so bodies cannot leave it.
/// Unknown characters and non-solid tiles yield `None`.
pub fn solid_cell_at(tiles: &impl TileLookup, point: Vec2) -> Option<Aabb> {
    let cell: IVec2 = (point / TILE_SIZE).floor().as_ivec2();
    let origin = cell.as_vec2() * TILE_SIZE;
    match tiles.char_at(point) {
        None => Some(Aabb::from_xywh(origin.x, origin.y, TILE_SIZE, TILE_SIZE)),
        Some(ch) => match tiles.tile_from_char(ch) {
            Some(tile) if tile.collision_type == CollisionType::Solid => {
                Some(tile.collision_box.translated(origin))
            }
            _ => None,
        },
    }
}

/// Another body's box as seen by the resolver this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub entity: Entity,
    pub aabb: Aabb,
}

/// Entities hit during one move, deduplicated, in hit order.
pub type CollidingEntities = ArrayVec<Entity, 4>;

/// Outcome of one [`Mover::move_body`] call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionResult {
    pub was_collision: bool,
    pub stands_on_ground: bool,
    /// Where the body may be placed; always inside the map.
    pub available_position: Vec2,
    pub colliding_entities: CollidingEntities,
}

impl CollisionResult {
    /// A result for a body that did not move and hit nothing.
    pub fn at(position: Vec2) -> Self {
        Self {
            available_position: position,
            ..Self::default()
        }
    }

    pub fn collided_with(&self, entity: Entity) -> bool {
        self.colliding_entities.contains(&entity)
    }

    pub(crate) fn record(&mut self, entity: Entity) {
        if !self.colliding_entities.contains(&entity) {
            // at most one entity per pass
            let _ = self.colliding_entities.try_push(entity);
        }
    }
}

/// Validates a proposed move for a body.
pub trait Mover {
    /// Resolve moving `body` to `target`.
    ///
    /// `None` means the mover declined; the body keeps its position and its
    /// previous collision result.
    fn move_body(&self, body: &RigidBody, target: Vec2) -> Option<CollisionResult>;
}

/// Keep a box of `local` (relative to the position) inside `bounds`.
pub(crate) fn clamp_into(bounds: &Aabb, local: &Aabb, position: Vec2) -> Vec2 {
    let lo = bounds.min - local.min;
    let hi = bounds.max - local.max;
    Vec2::new(
        if lo.x <= hi.x { position.x.clamp(lo.x, hi.x) } else { lo.x },
        if lo.y <= hi.y { position.y.clamp(lo.y, hi.y) } else { lo.y },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tilemap::{TileMap, TileSet};

    #[test]
    fn test_solid_cell_at_tile() {
        let map = TileMap::from_rows(&["  ", " #"], TileSet::standard()).unwrap();
        assert_eq!(
            solid_cell_at(&map, Vec2::new(20.0, 20.0)),
            Some(Aabb::from_xywh(16.0, 16.0, 16.0, 16.0))
        );
        assert_eq!(solid_cell_at(&map, Vec2::new(4.0, 4.0)), None);
    }

    #[test]
    fn test_solid_cell_at_outside_map_is_solid() {
        let map = TileMap::from_rows(&["  "], TileSet::standard()).unwrap();
        assert_eq!(
            solid_cell_at(&map, Vec2::new(-3.0, 5.0)),
            Some(Aabb::from_xywh(-16.0, 0.0, 16.0, 16.0))
        );
    }

    #[test]
    fn test_non_solid_tiles_never_block() {
        let map = TileMap::from_rows(&["=~§x"], TileSet::standard()).unwrap();
        for x in 0..4 {
            assert_eq!(solid_cell_at(&map, Vec2::new(x as f32 * 16.0 + 2.0, 2.0)), None);
        }
    }

    #[test]
    fn test_record_deduplicates() {
        let mut world = bevy_ecs::world::World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut r = CollisionResult::default();
        r.record(a);
        r.record(a);
        r.record(b);
        assert_eq!(r.colliding_entities.as_slice(), &[a, b]);
        assert!(r.collided_with(b));
    }

    #[test]
    fn test_clamp_into() {
        let bounds = Aabb::from_xywh(0.0, 0.0, 64.0, 64.0);
        let local = Aabb::from_xywh(2.0, 0.0, 12.0, 16.0);
        assert_eq!(clamp_into(&bounds, &local, Vec2::new(-10.0, 60.0)), Vec2::new(-2.0, 48.0));
        assert_eq!(clamp_into(&bounds, &local, Vec2::new(10.0, 10.0)), Vec2::new(10.0, 10.0));
    }
}
