//! Marker and bookkeeping components for simulated entities.

use bevy_ecs::prelude::{Component, Entity};

/// Position in the fixed per-tick processing order.
///
/// Assigned by [`EntityRegistry`](crate::resources::entityregistry::EntityRegistry)
/// when the spawn is requested. Lower numbers are simulated first, so a body
/// processed later in a tick collides against the already-moved boxes of
/// everything before it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpawnOrder(pub u64);

/// Entity is finished and will be despawned at the start of the next tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// A player-controlled wizard.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Player {
    /// 1-based player number, matching the map's spawn markers.
    pub index: u8,
}

/// Flies at constant velocity and dies on its first collision.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    /// The wizard that fired it.
    pub shooter: Entity,
}

/// Kills any wizard that touches it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hazard;
