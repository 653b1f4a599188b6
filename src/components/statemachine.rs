//! Stack-based behaviour state machine.
//!
//! A [`StateMachine`] owns every state an entity can be in (an arena indexed
//! by [`StateId`]) and a stack of the states currently active. The top of the
//! stack is authoritative: it is the only state whose outgoing signals are
//! evaluated. States below it are *passive*: their domain logic still runs
//! every tick (a wizard that pushed a firing state keeps falling), but they
//! cannot cause transitions.
//!
//! # Architecture
//!
//! - **Behaviour** – each state's domain logic implements [`StateBehavior`]
//!   (`on_enter`, `update`, `on_exit`, and the collision shape it wants)
//! - **Transition table** – each state keeps an insertion-ordered list of
//!   `(Signal, StackOp, target)` entries
//! - **Stack operations** – [`StackOp::Transition`] replaces the top,
//!   [`StackOp::Push`] stacks the target on top, [`StackOp::Pop`] removes the
//!   top so the state beneath resumes
//!
//! # Per-tick algorithm
//!
//! [`StateMachine::tick`] runs at most once per frame:
//!
//! 1. Passive states run their `update`, bottom of the stack first
//! 2. If the top state has not been entered since it became active, its
//!    signals are reset and `on_enter` runs
//! 3. The top state runs its `update`
//! 4. Every outgoing signal of the top state is advanced by `dt`
//! 5. The **first** signal in table order that triggers fires: `on_exit`
//!    runs and the stack operation is applied
//!
//! First-match is deliberate: when two signals trigger in the same tick the
//! one registered earlier wins.
//!
//! The stack never becomes empty. A pop at the root, or a push/transition to a
//! state that is already on the stack, is rejected without calling `on_exit`.

use bevy_ecs::prelude::{Component, Entity};
use log::{debug, warn};
use smallvec::SmallVec;

use crate::components::boxcollider::Shape;
use crate::components::controls::Controls;
use crate::components::rigidbody::{RigidBody, ShapeProvider};
use crate::components::signal::{Signal, SignalContext};
use crate::resources::entityregistry::SpawnRequest;
use crate::resources::gameconfig::PhysicsTuning;

/// Everything a state's domain logic may read or change during a tick.
pub struct BehaviorContext<'a> {
    pub entity: Entity,
    pub body: &'a mut RigidBody,
    pub controls: &'a Controls,
    pub tuning: &'a PhysicsTuning,
    /// Entities to add at the end of the tick.
    pub spawns: &'a mut Vec<SpawnRequest>,
}

impl BehaviorContext<'_> {
    pub fn signal_context(&self) -> SignalContext<'_> {
        SignalContext {
            controls: self.controls,
            body: self.body,
        }
    }
}

/// Domain logic of one state.
pub trait StateBehavior: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Collision shape while this state is on top; `None` keeps the
    /// machine's default.
    fn shape(&self) -> Option<Shape> {
        None
    }

    fn on_enter(&mut self, _ctx: &mut BehaviorContext) {}

    fn on_exit(&mut self, _ctx: &mut BehaviorContext) {}

    /// Per-tick domain logic, run both when active and when passive.
    fn update(&mut self, ctx: &mut BehaviorContext, dt: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    /// Replace the top with the target.
    Transition,
    /// Push the target on top of the current state.
    Push,
    /// Remove the top; the state beneath becomes active.
    Pop,
}

/// Result of one [`StateMachine::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No signal fired.
    Stayed,
    Fired {
        op: StackOp,
        from: &'static str,
        /// The new top of the stack.
        to: &'static str,
    },
    /// A signal fired but its operation would break the stack invariants.
    Rejected { op: StackOp, from: &'static str },
    /// The machine was already ticked for this frame.
    AlreadyTicked,
}

struct Transition {
    signal: Signal,
    op: StackOp,
    target: Option<StateId>,
}

struct StateNode {
    behavior: Box<dyn StateBehavior>,
    transitions: Vec<Transition>,
    entered: bool,
}

#[derive(Component)]
pub struct StateMachine {
    states: Vec<StateNode>,
    stack: SmallVec<[StateId; 4]>,
    last_frame: Option<u64>,
    default_shape: Shape,
}

impl StateMachine {
    /// Create a machine whose stack starts with `initial` (id 0).
    pub fn new(initial: Box<dyn StateBehavior>) -> Self {
        let mut machine = Self {
            states: Vec::new(),
            stack: SmallVec::new(),
            last_frame: None,
            default_shape: Shape::default(),
        };
        let id = machine.add_state(initial);
        machine.stack.push(id);
        machine
    }

    pub fn with_default_shape(mut self, shape: Shape) -> Self {
        self.default_shape = shape;
        self
    }

    pub fn add_state(&mut self, behavior: Box<dyn StateBehavior>) -> StateId {
        self.states.push(StateNode {
            behavior,
            transitions: Vec::new(),
            entered: false,
        });
        StateId(self.states.len() - 1)
    }

    fn check(&self, id: StateId) -> Result<(), String> {
        if id.0 < self.states.len() {
            Ok(())
        } else {
            Err(format!("Unknown state id {}", id.0))
        }
    }

    fn add_entry(
        &mut self,
        from: StateId,
        signal: Signal,
        op: StackOp,
        target: Option<StateId>,
    ) -> Result<(), String> {
        self.check(from)?;
        if let Some(target) = target {
            self.check(target)?;
        }
        self.states[from.0].transitions.push(Transition { signal, op, target });
        Ok(())
    }

    /// When `signal` fires in `from`, replace it with `to`.
    pub fn add_transition(&mut self, from: StateId, signal: Signal, to: StateId) -> Result<(), String> {
        self.add_entry(from, signal, StackOp::Transition, Some(to))
    }

    /// When `signal` fires in `from`, push `to` on top of it.
    pub fn add_push(&mut self, from: StateId, signal: Signal, to: StateId) -> Result<(), String> {
        self.add_entry(from, signal, StackOp::Push, Some(to))
    }

    /// When `signal` fires in `from`, pop it.
    pub fn add_pop(&mut self, from: StateId, signal: Signal) -> Result<(), String> {
        self.add_entry(from, signal, StackOp::Pop, None)
    }

    pub fn active(&self) -> StateId {
        // the stack is never empty
        self.stack[self.stack.len() - 1]
    }

    pub fn active_name(&self) -> &'static str {
        self.state_name(self.active())
    }

    pub fn state_name(&self, id: StateId) -> &'static str {
        self.states[id.0].behavior.name()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Names on the stack, bottom first.
    pub fn stack_names(&self) -> Vec<&'static str> {
        self.stack.iter().map(|id| self.state_name(*id)).collect()
    }

    pub fn is_entered(&self, id: StateId) -> bool {
        self.states[id.0].entered
    }

    /// Advance the machine for frame `frame`.
    pub fn tick(&mut self, ctx: &mut BehaviorContext, dt: f32, frame: u64) -> TickOutcome {
        if self.last_frame == Some(frame) {
            return TickOutcome::AlreadyTicked;
        }
        self.last_frame = Some(frame);

        let top_index = self.stack.len() - 1;
        for i in 0..top_index {
            let id = self.stack[i];
            self.states[id.0].behavior.update(ctx, dt);
        }

        let top = self.stack[top_index];
        let node = &mut self.states[top.0];
        if !node.entered {
            node.entered = true;
            for t in node.transitions.iter_mut() {
                t.signal.reset();
            }
            node.behavior.on_enter(ctx);
        }
        node.behavior.update(ctx, dt);
        for t in node.transitions.iter_mut() {
            t.signal.update(dt);
        }

        let fired = {
            let signals = ctx.signal_context();
            node.transitions.iter().position(|t| t.signal.triggers(&signals))
        };
        let Some(index) = fired else {
            return TickOutcome::Stayed;
        };
        let op = node.transitions[index].op;
        let target = node.transitions[index].target;
        let from = node.behavior.name();

        let allowed = match (op, target) {
            (StackOp::Pop, _) => self.stack.len() > 1,
            (StackOp::Push, Some(to)) => !self.stack.contains(&to),
            (StackOp::Transition, Some(to)) => to == top || !self.stack.contains(&to),
            (_, None) => false,
        };
        if !allowed {
            warn!(
                "Entity {:?}: {:?} from '{}' rejected, stack {:?}",
                ctx.entity,
                op,
                from,
                self.stack_names()
            );
            return TickOutcome::Rejected { op, from };
        }

        let node = &mut self.states[top.0];
        node.behavior.on_exit(ctx);
        node.entered = false;
        match (op, target) {
            (StackOp::Transition, Some(to)) => {
                self.stack.pop();
                self.stack.push(to);
            }
            (StackOp::Push, Some(to)) => self.stack.push(to),
            _ => {
                self.stack.pop();
            }
        }

        let to = self.active_name();
        debug!("Entity {:?}: {:?} '{}' -> '{}'", ctx.entity, op, from, to);
        TickOutcome::Fired { op, from, to }
    }
}

impl ShapeProvider for StateMachine {
    fn current_shape(&self) -> Shape {
        self.states[self.active().0]
            .behavior
            .shape()
            .unwrap_or(self.default_shape)
    }
}
