//! ECS resources made available to systems.
//!
//! Overview
//! - `entityregistry` – spawn order allocation and deferred spawn requests
//! - `gameconfig` – tick rate, collision algorithm and physics tuning
//! - `input` – scripted, random or idle button sources
//! - `scoreboard` – per-player scores and respawn points
//! - `tilemap` – the level grid and its tile set
//! - `worldtime` – simulation time, delta and frame counter
pub mod entityregistry;
pub mod gameconfig;
pub mod input;
pub mod scoreboard;
pub mod tilemap;
pub mod worldtime;
