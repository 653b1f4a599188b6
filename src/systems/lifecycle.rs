//! Entity lifecycle systems.
//!
//! - [`despawn_dead`] – garbage-collects entities marked [`Dead`] during the
//!   previous tick; runs first so the tick only sees live entities
//! - [`award_kills`] – scores every player who died this tick for its
//!   opponents and spawns a fresh wizard at the player's spawn point
//!
//! # System Flow
//!
//! A death is recorded in tick N (the simulation inserts `Dead`), scored in
//! tick N by `award_kills` and despawned at the start of tick N + 1. The
//! replacement wizard is live from tick N + 1 and is processed after every
//! entity spawned before it.

use bevy_ecs::prelude::*;
use log::{error, info};

use crate::components::lifecycle::{Dead, Player};
use crate::game::spawn_wizard;
use crate::resources::entityregistry::EntityRegistry;
use crate::resources::gameconfig::GameConfig;
use crate::resources::scoreboard::Scoreboard;

/// Despawn every entity marked [`Dead`].
pub fn despawn_dead(query: Query<Entity, With<Dead>>, mut commands: Commands) {
    for entity in query.iter() {
        commands.entity(entity).try_despawn();
    }
}

/// Score and respawn players that died this tick.
pub fn award_kills(
    dead_players: Query<&Player, Added<Dead>>,
    mut scoreboard: ResMut<Scoreboard>,
    mut registry: ResMut<EntityRegistry>,
    config: Res<GameConfig>,
    mut commands: Commands,
) {
    let mut fallen: Vec<u8> = dead_players.iter().map(|p| p.index).collect();
    fallen.sort_unstable();
    for player in fallen {
        scoreboard.record_death(player);
        info!("Score: {:?}", scoreboard.standings());
        let Some(point) = scoreboard.spawn_point(player) else {
            continue;
        };
        if let Err(e) = spawn_wizard(&mut commands, &mut registry, &config.physics, player, point) {
            error!("Failed to respawn player {}: {}", player, e);
        }
    }
}
