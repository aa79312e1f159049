//! # rshsm-core
//!
//! Hierarchical state machine engine.
//!
//! This crate provides:
//! - A generic machine over user-defined state and event identifiers
//! - Substate trees with entry points and transition inheritance
//! - Guarded transitions with entry/exit/changed callbacks
//! - An ordered event queue with async and blocking submission
//! - A pluggable event-loop dispatcher contract
//!
//! Dispatcher back-ends live in `rshsm-dispatch`.
//!
//! # Example
//!
//! ```no_run
//! use rshsm_core::{args, HierarchicalStateMachine};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum State { Off, On }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Event { Switch }
//!
//! # fn dispatcher() -> Arc<dyn rshsm_core::EventDispatcher> { unimplemented!() }
//! let machine = HierarchicalStateMachine::new(State::Off);
//! machine.register_transition(State::Off, State::On, Event::Switch, None, None);
//! machine.register_transition(State::On, State::Off, Event::Switch, None, None);
//! machine.initialize(dispatcher()).unwrap();
//!
//! machine.transition(Event::Switch, args![]);
//! ```

use std::fmt;
use std::hash::Hash;

pub mod dispatcher;
pub mod error;
pub mod machine;
mod queue;
pub mod states;
pub mod sync;
pub mod transitions;
pub mod variant;

pub use dispatcher::{EventDispatcher, EventHandler, HandlerId, INVALID_HANDLER_ID};
pub use error::HsmError;
pub use machine::HierarchicalStateMachine;
pub use states::{StateChangedCallback, StateEnterCallback, StateExitCallback};
pub use sync::WAIT_INDEFINITELY;
pub use transitions::{TransitionAction, TransitionGuard};
pub use variant::{Variant, VariantList};

/// Bounds required of user-supplied state identifiers.
///
/// Blanket-implemented; any cheap-to-clone id type with equality and
/// hashing qualifies, enums most commonly.
pub trait StateKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> StateKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Bounds required of user-supplied event identifiers.
pub trait EventKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> EventKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}
