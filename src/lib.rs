//! Aberred Platformer library.
//!
//! A headless simulation core for a tile-based 2D platformer: wizards run,
//! jump and shoot across a tile map, driven by stacked state machines and
//! resolved against the map by pixel-perfect collision.
//!
//! This module exposes the components, resources, systems and events for use
//! by the command-line runner and in integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod physics;
pub mod resources;
pub mod systems;
pub mod wizard;
