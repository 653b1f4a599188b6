//! Spawn bookkeeping for the fixed entity processing order.
//!
//! Every simulated entity gets a [`SpawnOrder`] from the [`EntityRegistry`]
//! the moment its spawn is requested. Spawns requested during a tick are
//! queued as [`SpawnRequest`]s and only become live entities once the tick's
//! commands are applied, so the simulation never sees an entity appear in
//! the middle of its own iteration.

use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;

use crate::components::lifecycle::SpawnOrder;

/// An entity a behaviour state wants added at the end of the tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnRequest {
    Bullet {
        /// Top-left of the bullet's frame.
        position: Vec2,
        /// Constant velocity in world units per tick.
        velocity: Vec2,
        shooter: Entity,
    },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EntityRegistry {
    next: u64,
    spawned: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next processing slot.
    pub fn next_order(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next);
        self.next += 1;
        self.spawned += 1;
        order
    }

    /// Total spawns requested since the registry was created.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }
}
