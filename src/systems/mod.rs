//! Simulation systems.
//!
//! Submodules overview
//! - [`input`] – copy this tick's buttons into each wizard's controls
//! - [`lifecycle`] – despawn the dead, score kills and respawn wizards
//! - [`render`] – draw the map and entities as text
//! - [`simulation`] – tick state machines and move bodies in spawn order
//! - [`time`] – advance the simulation clock

pub mod input;
pub mod lifecycle;
pub mod render;
pub mod simulation;
pub mod time;
