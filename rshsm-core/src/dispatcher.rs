//! Contract between the machine and an external event loop.
//!
//! The engine is passive: it never owns a thread. Submitting an event only
//! appends it to the machine's queue and calls [`EventDispatcher::emit_event`];
//! the dispatcher later invokes the registered handler from its own loop
//! thread, and that invocation is what drains the queue one event at a time.
//!
//! A conforming dispatcher must:
//! - invoke registered handlers serially (no overlapping invocations);
//! - never drop an emit while a handler is registered (coalescing multiple
//!   emits into a single wakeup is allowed, the machine re-emits while its
//!   queue is non-empty);
//! - accept [`EventDispatcher::emit_event`] from any thread.

/// Identifier assigned to a registered event handler.
pub type HandlerId = i64;

/// Sentinel id meaning "no handler registered".
///
/// A dispatcher returns it to refuse a registration; the machine treats it
/// as a failed [`initialize`](crate::HierarchicalStateMachine::initialize).
pub const INVALID_HANDLER_ID: HandlerId = -1;

/// Callback invoked by a dispatcher when pending events are signaled.
#[cfg(not(feature = "single-threaded"))]
pub type EventHandler = Box<dyn Fn() + Send + Sync>;

/// Callback invoked by a dispatcher when pending events are signaled.
#[cfg(feature = "single-threaded")]
pub type EventHandler = Box<dyn Fn()>;

/// Event-loop adapter the machine delegates its wakeups to.
///
/// One dispatcher is typically shared by several machines; each machine
/// registers its own handler.
#[cfg(not(feature = "single-threaded"))]
pub trait EventDispatcher: Send + Sync {
    /// Prepares the native loop integration. Idempotent.
    ///
    /// Returns false if the integration cannot be established.
    fn start(&self) -> bool;

    /// Stores a handler to be invoked from the loop thread on wakeups.
    ///
    /// Returns [`INVALID_HANDLER_ID`] to refuse the registration.
    fn register_event_handler(&self, handler: EventHandler) -> HandlerId;

    /// Removes a handler. The dispatcher must not invoke it afterwards.
    fn unregister_event_handler(&self, handler_id: HandlerId);

    /// Signals the loop that at least one pending event exists.
    fn emit_event(&self);
}

/// Event-loop adapter the machine delegates its wakeups to.
///
/// Single-threaded build: handlers and the dispatcher itself stay on the
/// owning thread, so no `Send`/`Sync` bounds apply.
#[cfg(feature = "single-threaded")]
pub trait EventDispatcher {
    /// Prepares the native loop integration. Idempotent.
    ///
    /// Returns false if the integration cannot be established.
    fn start(&self) -> bool;

    /// Stores a handler to be invoked from the loop thread on wakeups.
    ///
    /// Returns [`INVALID_HANDLER_ID`] to refuse the registration.
    fn register_event_handler(&self, handler: EventHandler) -> HandlerId;

    /// Removes a handler. The dispatcher must not invoke it afterwards.
    fn unregister_event_handler(&self, handler_id: HandlerId);

    /// Signals the loop that at least one pending event exists.
    fn emit_event(&self);
}
