//! Behaviour state change event.
//!
//! This module defines [`StateChangeEvent`], which is triggered whenever a
//! signal fires in an entity's
//! [`StateMachine`](crate::components::statemachine::StateMachine) and the
//! stack operation is applied.
//!
//! # Usage
//!
//! ```ignore
//! fn on_state_change(trigger: On<StateChangeEvent>) {
//!     let ev = trigger.event();
//!     println!("{:?}: {} -> {}", ev.entity, ev.from, ev.to);
//! }
//!
//! world.add_observer(on_state_change);
//! ```

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::statemachine::StackOp;

/// Event emitted after a stack operation was applied.
///
/// Triggered by [`simulation_tick`](crate::systems::simulation::simulation_tick)
/// after `on_exit` ran for the old top and before the new top is entered on
/// the next tick.
#[derive(Event, Debug, Clone)]
pub struct StateChangeEvent {
    pub entity: Entity,
    pub op: StackOp,
    pub from: &'static str,
    /// The new top of the stack.
    pub to: &'static str,
    pub frame: u64,
}

/// Default observer: logs every change at debug level.
pub fn log_state_change(trigger: On<StateChangeEvent>) {
    let ev = trigger.event();
    debug!(
        "[frame {}] {:?} {:?}: {} -> {}",
        ev.frame, ev.entity, ev.op, ev.from, ev.to
    );
}
