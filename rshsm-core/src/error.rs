//! Engine error types.

use thiserror::Error;

/// Errors from machine initialization and structure registration.
///
/// Event submission never returns an error: an event that cannot be applied
/// is dropped and, for synchronous submitters, reported through the `bool`
/// result of the submit call.
#[derive(Debug, Error)]
pub enum HsmError {
    #[error("dispatcher failed to start")]
    DispatcherNotStarted,

    #[error("dispatcher rejected the event handler registration")]
    HandlerRegistrationFailed,

    #[error("state {state} cannot be its own substate")]
    SelfSubstate { state: String },

    #[error("substate {child} is already attached to parent {parent}")]
    SubstateAlreadyAttached { child: String, parent: String },

    #[error("attaching {child} under {parent} would close a substate cycle")]
    SubstateCycle { child: String, parent: String },

    #[error("parent {parent} needs an entry point before regular substates can be added")]
    MissingEntryPoint { parent: String },

    #[error("parent {parent} already has entry point {entry_point}")]
    DuplicateEntryPoint { parent: String, entry_point: String },
}
