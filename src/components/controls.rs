//! Per-wizard input state.
//!
//! [`Controls`] holds the five buttons a wizard reacts to. The input system
//! fills it once per tick, before the simulation runs, from an input script
//! or the random bot; behaviour states and signals only ever read it.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// A logical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Left,
    Right,
    Jump,
    Fire,
    Crouch,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Left, Key::Right, Key::Jump, Key::Fire, Key::Crouch];
}

/// Buttons held this tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
    pub crouch: bool,
}

impl Controls {
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a Key>) -> Self {
        let mut controls = Self::default();
        for key in keys {
            controls.set(*key, true);
        }
        controls
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Jump => self.jump = pressed,
            Key::Fire => self.fire = pressed,
            Key::Crouch => self.crouch = pressed,
        }
    }

    pub fn pressed(&self, key: Key) -> bool {
        match key {
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Jump => self.jump,
            Key::Fire => self.fire,
            Key::Crouch => self.crouch,
        }
    }

    /// Release every button.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
