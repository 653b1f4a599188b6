//! Simulation configuration resource.
//!
//! Holds the tick rate, run length, collision algorithm and every physics
//! constant the wizard behaviour uses. Defaults are usable without a file;
//! values found in the INI file override them.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! tick_rate = 60
//! max_ticks = 600
//! ; snap | sweep
//! collision = snap
//! sweep_iterations = 4
//!
//! [physics]
//! gravity = 3.5
//! walk_speed = 3.0
//! air_speed = 1.0
//! jump_force = 5.0
//! jump_duration = 1.5
//! jump_ready_delay = 0.2
//! landing_grace = 0.2
//! dive_speed = 3.0
//! bullet_speed = 3.0
//! fire_duration = 0.2
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_TICK_RATE: u32 = 60;
const DEFAULT_MAX_TICKS: u64 = 600;
const DEFAULT_SWEEP_ITERATIONS: u32 = 4;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Which resolver validates body moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionAlgorithm {
    /// Axis-separated snap with ground probe.
    #[default]
    Snap,
    /// Bounded binary-search sweep.
    Sweep,
}

impl CollisionAlgorithm {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "snap" => Some(CollisionAlgorithm::Snap),
            "sweep" => Some(CollisionAlgorithm::Sweep),
            _ => None,
        }
    }
}

/// Physics constants for wizards and bullets.
///
/// Velocities are in world units per tick, accelerations in world units per
/// tick per second, durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub walk_speed: f32,
    pub air_speed: f32,
    pub jump_force: f32,
    pub jump_duration: f32,
    /// Time on the ground before a jump is accepted.
    pub jump_ready_delay: f32,
    /// Time after take-off during which a collision does not end the jump.
    pub landing_grace: f32,
    pub dive_speed: f32,
    pub bullet_speed: f32,
    pub fire_duration: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 3.5,
            walk_speed: 3.0,
            air_speed: 1.0,
            jump_force: 5.0,
            jump_duration: 1.5,
            jump_ready_delay: 0.2,
            landing_grace: 0.2,
            dive_speed: 3.0,
            bullet_speed: 3.0,
            fire_duration: 0.2,
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Ticks per simulated second; `dt = 1 / tick_rate`.
    pub tick_rate: u32,
    /// Ticks to run when no count is given on the command line.
    pub max_ticks: u64,
    pub collision: CollisionAlgorithm,
    /// Halvings the sweep resolver tries before giving up.
    pub sweep_iterations: u32,
    pub physics: PhysicsTuning,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_ticks: DEFAULT_MAX_TICKS,
            collision: CollisionAlgorithm::default(),
            sweep_iterations: DEFAULT_SWEEP_ITERATIONS,
            physics: PhysicsTuning::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    /// Same as [`load_from_file`](Self::load_from_file) but from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [simulation] section
        if let Some(rate) = config.getuint("simulation", "tick_rate").ok().flatten() {
            if rate > 0 {
                self.tick_rate = rate as u32;
            } else {
                warn!("Ignoring tick_rate = 0");
            }
        }
        if let Some(ticks) = config.getuint("simulation", "max_ticks").ok().flatten() {
            self.max_ticks = ticks;
        }
        if let Some(value) = config.get("simulation", "collision") {
            match CollisionAlgorithm::parse(&value) {
                Some(algorithm) => self.collision = algorithm,
                None => warn!("Unknown collision algorithm '{}', keeping {:?}", value, self.collision),
            }
        }
        if let Some(n) = config.getuint("simulation", "sweep_iterations").ok().flatten() {
            self.sweep_iterations = n as u32;
        }

        // [physics] section
        let p = &mut self.physics;
        for (key, field) in [
            ("gravity", &mut p.gravity),
            ("walk_speed", &mut p.walk_speed),
            ("air_speed", &mut p.air_speed),
            ("jump_force", &mut p.jump_force),
            ("jump_duration", &mut p.jump_duration),
            ("jump_ready_delay", &mut p.jump_ready_delay),
            ("landing_grace", &mut p.landing_grace),
            ("dive_speed", &mut p.dive_speed),
            ("bullet_speed", &mut p.bullet_speed),
            ("fire_duration", &mut p.fire_duration),
        ] {
            if let Some(value) = config.getfloat("physics", key).ok().flatten() {
                *field = value as f32;
            }
        }

        info!(
            "Loaded config: tick_rate={}, max_ticks={}, collision={:?}, gravity={}, walk_speed={}",
            self.tick_rate, self.max_ticks, self.collision, self.physics.gravity, self.physics.walk_speed
        );
    }
}
