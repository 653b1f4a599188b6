//! Where each tick's button presses come from.
//!
//! The simulation is headless, so wizards are driven by an [`InputSource`]
//! resource instead of a keyboard:
//!
//! - [`InputSource::Script`] replays an [`InputScript`], a list of frame
//!   ranges per player with the keys held during each range
//! - [`InputSource::Bot`] presses random key combinations, holding each one
//!   for a random number of ticks; seeded so runs are repeatable
//! - [`InputSource::Idle`] never presses anything
//!
//! # Script format
//!
//! ```json
//! { "players": [
//!     { "player": 1, "segments": [ { "from": 0, "to": 30, "keys": ["right", "jump"] } ] }
//! ] }
//! ```
//!
//! A segment covers frames `from..to` (end exclusive). Overlapping segments
//! combine their keys.

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::components::controls::{Controls, Key};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: u64,
    pub to: u64,
    #[serde(default)]
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScript {
    pub player: u8,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub players: Vec<PlayerScript>,
}

impl InputScript {
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let script: InputScript =
            serde_json::from_str(json).map_err(|e| format!("Invalid input script: {}", e))?;
        for p in &script.players {
            if let Some(bad) = p.segments.iter().find(|s| s.to < s.from) {
                return Err(format!(
                    "Player {}: segment {}..{} ends before it starts",
                    p.player, bad.from, bad.to
                ));
            }
        }
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read input script {}: {}", path.display(), e))?;
        let script = Self::from_json_str(&text)?;
        info!(
            "Loaded input script {} ({} players)",
            path.display(),
            script.players.len()
        );
        Ok(script)
    }

    /// Buttons held by `player` on `frame`.
    pub fn controls_for(&self, player: u8, frame: u64) -> Controls {
        let keys = self
            .players
            .iter()
            .filter(|p| p.player == player)
            .flat_map(|p| p.segments.iter())
            .filter(|s| s.from <= frame && frame < s.to)
            .flat_map(|s| s.keys.iter());
        Controls::from_keys(keys)
    }
}

/// Random button masher.
#[derive(Debug, Clone)]
pub struct InputBot {
    rng: fastrand::Rng,
    /// Per player: the combination being held and ticks left to hold it.
    held: FxHashMap<u8, (Controls, u32)>,
}

impl InputBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            held: FxHashMap::default(),
        }
    }

    pub fn controls_for(&mut self, player: u8) -> Controls {
        let rng = &mut self.rng;
        let entry = self.held.entry(player).or_insert((Controls::default(), 0));
        if entry.1 == 0 {
            let mut controls = Controls::default();
            match rng.u8(0..3) {
                0 => controls.left = true,
                1 => controls.right = true,
                _ => {}
            }
            controls.jump = rng.u8(0..4) == 0;
            controls.fire = rng.u8(0..6) == 0;
            controls.crouch = rng.u8(0..8) == 0;
            *entry = (controls, rng.u32(5..40));
        }
        entry.1 -= 1;
        entry.0
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub enum InputSource {
    Script(InputScript),
    Bot(InputBot),
    #[default]
    Idle,
}

impl InputSource {
    pub fn controls_for(&mut self, player: u8, frame: u64) -> Controls {
        match self {
            InputSource::Script(script) => script.controls_for(player, frame),
            InputSource::Bot(bot) => bot.controls_for(player),
            InputSource::Idle => Controls::default(),
        }
    }
}
