//! Match score and respawn points.

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use rustc_hash::FxHashMap;

#[derive(Resource, Debug, Clone, Default)]
pub struct Scoreboard {
    scores: FxHashMap<u8, u32>,
    spawn_points: FxHashMap<u8, Vec2>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player and where it (re)spawns.
    pub fn add_player(&mut self, player: u8, spawn_point: Vec2) {
        self.scores.entry(player).or_insert(0);
        self.spawn_points.insert(player, spawn_point);
    }

    pub fn spawn_point(&self, player: u8) -> Option<Vec2> {
        self.spawn_points.get(&player).copied()
    }

    pub fn score(&self, player: u8) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    /// Every registered player except `player`.
    pub fn opponents(&self, player: u8) -> Vec<u8> {
        let mut others: Vec<u8> = self.scores.keys().copied().filter(|p| *p != player).collect();
        others.sort_unstable();
        others
    }

    /// A point for every opponent of the player who died.
    pub fn record_death(&mut self, player: u8) {
        for other in self.opponents(player) {
            *self.scores.entry(other).or_insert(0) += 1;
        }
    }

    /// `(player, score)` pairs in player order.
    pub fn standings(&self) -> Vec<(u8, u32)> {
        let mut all: Vec<(u8, u32)> = self.scores.iter().map(|(p, s)| (*p, *s)).collect();
        all.sort_unstable();
        all
    }
}
