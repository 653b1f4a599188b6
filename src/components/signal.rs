//! Composable, stateful trigger conditions for state transitions.
//!
//! A [`Signal`] is a boolean condition that may carry its own timer. Signals
//! are owned by the transition table of a state; composites own their
//! children, so two transitions built from "the same" sub-signal hold two
//! independent copies with independent timers.
//!
//! Every tick the owning state calls [`Signal::update`] once on each of its
//! outgoing signals and then asks [`Signal::triggers`]:
//!
//! - [`Signal::Basic`] evaluates a predicate over the entity's controls and
//!   body; it has no state
//! - [`Signal::Delay`] accumulates elapsed time and triggers once it reaches
//!   its duration; it keeps triggering until reset
//! - [`Signal::And`] / [`Signal::Or`] combine two children; both children are
//!   always advanced, whatever the boolean result
//!
//! Signals are reset when their owning state is entered.
//!
//! # Example
//!
//! ```ignore
//! fn jump_pressed(ctx: &SignalContext) -> bool { ctx.controls.jump }
//!
//! // jump only after 0.2 s in the state
//! let jump_ready = Signal::delay(0.2).and(Signal::basic(jump_pressed));
//! ```

use std::fmt;

use crate::components::controls::Controls;
use crate::components::rigidbody::RigidBody;

/// What a predicate may look at.
pub struct SignalContext<'a> {
    pub controls: &'a Controls,
    pub body: &'a RigidBody,
}

pub type Predicate = fn(&SignalContext<'_>) -> bool;

#[derive(Clone)]
pub enum Signal {
    Basic(Predicate),
    Delay { duration: f32, elapsed: f32 },
    And(Box<Signal>, Box<Signal>),
    Or(Box<Signal>, Box<Signal>),
}

impl Signal {
    pub fn basic(predicate: Predicate) -> Self {
        Signal::Basic(predicate)
    }

    pub fn delay(duration: f32) -> Self {
        Signal::Delay {
            duration,
            elapsed: 0.0,
        }
    }

    pub fn and(self, other: Signal) -> Self {
        Signal::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Signal) -> Self {
        Signal::Or(Box::new(self), Box::new(other))
    }

    /// `a || b || c`, nested as `Or(a, Or(b, c))`.
    pub fn any3(a: Signal, b: Signal, c: Signal) -> Self {
        a.or(b.or(c))
    }

    /// Advance timers by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        match self {
            Signal::Basic(_) => {}
            Signal::Delay { elapsed, .. } => *elapsed += dt,
            Signal::And(a, b) | Signal::Or(a, b) => {
                a.update(dt);
                b.update(dt);
            }
        }
    }

    pub fn triggers(&self, ctx: &SignalContext<'_>) -> bool {
        match self {
            Signal::Basic(predicate) => predicate(ctx),
            Signal::Delay { duration, elapsed } => *elapsed >= *duration,
            Signal::And(a, b) => {
                let (a, b) = (a.triggers(ctx), b.triggers(ctx));
                a && b
            }
            Signal::Or(a, b) => {
                let (a, b) = (a.triggers(ctx), b.triggers(ctx));
                a || b
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            Signal::Basic(_) => {}
            Signal::Delay { elapsed, .. } => *elapsed = 0.0,
            Signal::And(a, b) | Signal::Or(a, b) => {
                a.reset();
                b.reset();
            }
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Basic(_) => write!(f, "Basic"),
            Signal::Delay { duration, elapsed } => {
                write!(f, "Delay({:.3}/{:.3})", elapsed, duration)
            }
            Signal::And(a, b) => write!(f, "And({:?}, {:?})", a, b),
            Signal::Or(a, b) => write!(f, "Or({:?}, {:?})", a, b),
        }
    }
}
