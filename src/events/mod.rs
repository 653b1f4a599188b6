//! Event types and observers.
//!
//! Submodules:
//! - [`kill`] – a wizard died, and who gets the credit
//! - [`statechange`] – a state machine fired a transition, push or pop
pub mod kill;
pub mod statechange;
