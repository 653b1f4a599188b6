//! Axis-aligned boxes and collision shapes.
//!
//! [`Aabb`] is the rectangle type used everywhere in collision resolution.
//! Intersection is strict: two boxes that only share an edge do not
//! intersect, which is what lets a body rest exactly on top of a tile.
//!
//! [`Shape`] is what a shape provider hands to a
//! [`RigidBody`](super::rigidbody::RigidBody) each tick: the sprite-sized
//! frame plus the local collision box inside it. Static entities (bullets,
//! spikes) carry a `Shape` component directly; wizards get theirs from the
//! active behaviour state.

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// Build a box from its corners, normalizing so `min <= max`.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// A box with no area never collides with anything.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Strict overlap test. Touching edges do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Half-open point containment: the max edges are outside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// The four corners: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.min.y),
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.min.x, self.max.y),
            Vec2::new(self.max.x, self.max.y),
        ]
    }

    /// Mirror the box horizontally inside a frame of width `frame_width`.
    pub fn flipped_horizontal(&self, frame_width: f32) -> Self {
        Self::from_xywh(
            frame_width - self.min.x - self.width(),
            self.min.y,
            self.width(),
            self.height(),
        )
    }
}

/// Collision shape in entity-local coordinates.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    /// Full frame size (the sprite cell).
    pub size: Vec2,
    /// Collision box relative to the entity position.
    pub collision_box: Aabb,
}

impl Default for Shape {
    fn default() -> Self {
        Self::square(16.0)
    }
}

impl Shape {
    pub fn new(size: Vec2, collision_box: Aabb) -> Self {
        Self {
            size,
            collision_box,
        }
    }

    /// A shape whose collision box fills a `side` x `side` frame.
    pub fn square(side: f32) -> Self {
        Self {
            size: Vec2::splat(side),
            collision_box: Aabb::from_xywh(0.0, 0.0, side, side),
        }
    }

    /// Sprites are authored facing left; facing right mirrors the box.
    pub fn oriented(&self, look_at: Vec2) -> Self {
        if look_at.x > 0.0 {
            Self {
                size: self.size,
                collision_box: self.collision_box.flipped_horizontal(self.size.x),
            }
        } else {
            *self
        }
    }

    /// World-space bounding box for an entity at `position`.
    pub fn bounding_box(&self, position: Vec2) -> Aabb {
        self.collision_box.translated(position)
    }

    /// Local pixel centres along the border of the collision box.
    ///
    /// For a box obstacle the interior can only overlap once the border
    /// does, so the border pixels stand in for the solid pixel set.
    pub fn perimeter_pixels(&self) -> Vec<Vec2> {
        let b = self.collision_box;
        if b.is_empty() {
            return Vec::new();
        }
        let w = b.width().ceil().max(1.0) as i32;
        let h = b.height().ceil().max(1.0) as i32;
        let mut pixels = Vec::with_capacity((2 * (w + h)) as usize);
        for x in 0..w {
            pixels.push(b.min + Vec2::new(x as f32, 0.0));
            if h > 1 {
                pixels.push(b.min + Vec2::new(x as f32, (h - 1) as f32));
            }
        }
        for y in 1..(h - 1).max(1) {
            pixels.push(b.min + Vec2::new(0.0, y as f32));
            if w > 1 {
                pixels.push(b.min + Vec2::new((w - 1) as f32, y as f32));
            }
        }
        pixels
    }
}
