//! Kill event and its default observer.
//!
//! The simulation triggers a [`KillEvent`] when a wizard touches a hazard or
//! is hit by a bullet. The victim has already been marked
//! [`Dead`](crate::components::lifecycle::Dead) when observers run; scoring
//! and respawning happen later in the same tick in
//! [`award_kills`](crate::systems::lifecycle::award_kills).
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillCause {
    Bullet,
    Hazard,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct KillEvent {
    pub victim: Entity,
    /// The wizard that fired the bullet, if any.
    pub killer: Option<Entity>,
    pub cause: KillCause,
    pub frame: u64,
}

pub fn log_kill(trigger: On<KillEvent>) {
    let ev = trigger.event();
    match ev.killer {
        Some(killer) => info!(
            "[frame {}] {:?} killed by {:?} ({:?})",
            ev.frame, ev.victim, killer, ev.cause
        ),
        None => info!("[frame {}] {:?} killed ({:?})", ev.frame, ev.victim, ev.cause),
    }
}
