//! ECS components for simulated entities.
//!
//! Submodules overview:
//! - [`boxcollider`] – axis-aligned boxes and per-state collision shapes
//! - [`controls`] – the buttons a wizard holds this tick
//! - [`lifecycle`] – spawn order, death marker and entity role tags
//! - [`rigidbody`] – kinematic body driven by named force slots
//! - [`signal`] – composable conditions that trigger state changes
//! - [`statemachine`] – stack of behaviour states with signal-driven transitions

pub mod boxcollider;
pub mod controls;
pub mod lifecycle;
pub mod rigidbody;
pub mod signal;
pub mod statemachine;
