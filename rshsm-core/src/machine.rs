//! The hierarchical state machine: façade, event queue, and the transition
//! executor.
//!
//! The machine is passive. Submissions append to the pending queue and
//! signal the attached [`EventDispatcher`]; the dispatcher invokes the
//! machine's handler from its loop thread, and each invocation processes
//! exactly one queued event, re-arming the dispatcher while the queue is
//! non-empty. All state/guard/action callbacks therefore run on the
//! dispatcher thread.
//!
//! Callbacks must not submit synchronously from the dispatcher thread: the
//! submitter would wait for a tick that can never run.

use crate::dispatcher::{EventDispatcher, EventHandler, HandlerId, INVALID_HANDLER_ID};
use crate::error::HsmError;
use crate::queue::{clear_pending, EventQueue, PendingEvent, QueueLock};
use crate::states::{StateChangedCallback, StateEnterCallback, StateExitCallback, StateGraph};
use crate::sync::{EventStatus, SyncHandle};
use crate::transitions::{TransitionAction, TransitionGuard, TransitionRecord, TransitionTable};
use crate::variant::VariantList;
use crate::{EventKey, StateKey};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, trace, warn};

/// A generic hierarchical state machine over user-defined state and event
/// identifiers.
///
/// Construction fixes the initial state; [`initialize`] attaches a
/// dispatcher and must succeed before any event is processed. States,
/// substates, and transitions may be registered before or after
/// initialization, but not while events are being dispatched.
///
/// [`initialize`]: HierarchicalStateMachine::initialize
pub struct HierarchicalStateMachine<S, E> {
    inner: Arc<MachineInner<S, E>>,
}

struct DispatcherBinding {
    dispatcher: Arc<dyn EventDispatcher>,
    handler_id: HandlerId,
}

struct MachineInner<S, E> {
    current: RwLock<S>,
    graph: RwLock<StateGraph<S>>,
    transitions: RwLock<TransitionTable<S, E>>,
    queue: EventQueue<E>,
    dispatcher: Mutex<Option<DispatcherBinding>>,
    stop_dispatching: AtomicBool,
}

impl<S, E> HierarchicalStateMachine<S, E>
where
    S: StateKey,
    E: EventKey,
{
    /// Creates a machine resting in `initial_state`.
    pub fn new(initial_state: S) -> Self {
        Self {
            inner: Arc::new(MachineInner {
                current: RwLock::new(initial_state),
                graph: RwLock::new(StateGraph::new()),
                transitions: RwLock::new(TransitionTable::new()),
                queue: QueueLock::new(VecDeque::new()),
                dispatcher: Mutex::new(None),
                stop_dispatching: AtomicBool::new(false),
            }),
        }
    }

    /// Attaches the dispatcher that will drive this machine.
    ///
    /// Starts the dispatcher and registers the machine's dispatch handler
    /// with it. Fails if the dispatcher cannot start or refuses the
    /// registration; no event is processed until this succeeds.
    pub fn initialize(&self, dispatcher: Arc<dyn EventDispatcher>) -> Result<(), HsmError> {
        if !dispatcher.start() {
            error!("failed to start dispatcher");
            return Err(HsmError::DispatcherNotStarted);
        }

        let weak = Arc::downgrade(&self.inner);
        let handler: EventHandler = Box::new(move || {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.dispatch_events();
            }
        });

        let handler_id = dispatcher.register_event_handler(handler);
        if handler_id == INVALID_HANDLER_ID {
            error!("dispatcher refused the event handler registration");
            return Err(HsmError::HandlerRegistrationFailed);
        }

        *self.inner.dispatcher.lock() = Some(DispatcherBinding {
            dispatcher,
            handler_id,
        });

        Ok(())
    }

    /// Detaches the dispatcher and stops all event processing.
    ///
    /// Idempotent; also invoked when the machine is dropped. The pending
    /// queue is not drained: submitters still waiting observe their timeout.
    pub fn release(&self) {
        self.inner.release();
    }

    /// Installs callbacks for a state. Calling again for the same state
    /// replaces the previous registration; a call with no callbacks is a
    /// no-op.
    pub fn register_state(
        &self,
        state: S,
        on_changed: Option<StateChangedCallback>,
        on_entering: Option<StateEnterCallback>,
        on_exiting: Option<StateExitCallback>,
    ) {
        self.inner
            .graph
            .write()
            .register_state(state, on_changed, on_entering, on_exiting);
    }

    /// Attaches `child` under `parent`; see
    /// [`StateGraph` validation](crate::states) for the failure cases.
    /// Transitions landing on `parent` descend into its entry point.
    pub fn register_substate(
        &self,
        parent: S,
        child: S,
        is_entry_point: bool,
    ) -> Result<(), HsmError> {
        self.inner
            .graph
            .write()
            .register_substate(&parent, &child, is_entry_point)
    }

    /// Appends a transition row for `(from, on_event)`. Rows sharing the
    /// key are considered in registration order.
    pub fn register_transition(
        &self,
        from: S,
        to: S,
        on_event: E,
        action: Option<TransitionAction>,
        guard: Option<TransitionGuard>,
    ) {
        self.inner
            .transitions
            .write()
            .register(from, to, on_event, action, guard);
    }

    /// Returns the state the machine currently rests in.
    pub fn current_state(&self) -> S {
        self.inner.current.read().clone()
    }

    /// Submits an event asynchronously.
    pub fn transition(&self, event: E, args: VariantList) {
        self.transition_ex(event, false, false, crate::WAIT_INDEFINITELY, args);
    }

    /// Submits an event asynchronously after clearing the pending queue.
    ///
    /// Cleared synchronous submitters observe failure; entry-point
    /// follow-ups of an in-flight transition are preserved.
    pub fn transition_with_queue_clear(&self, event: E, args: VariantList) {
        self.transition_ex(event, true, false, crate::WAIT_INDEFINITELY, args);
    }

    /// Submits an event and blocks until it is fully processed, including
    /// any entry-point descent, or until `timeout_ms` elapses
    /// ([`WAIT_INDEFINITELY`](crate::WAIT_INDEFINITELY) waits forever).
    ///
    /// Returns true iff the transition committed. On timeout the event
    /// stays queued and may still be processed later.
    ///
    /// Must not be called from the dispatcher thread.
    pub fn transition_sync(&self, event: E, timeout_ms: u64, args: VariantList) -> bool {
        self.transition_ex(event, false, true, timeout_ms, args)
    }

    /// Extended submission with every knob exposed.
    ///
    /// Async submissions always return true.
    pub fn transition_ex(
        &self,
        event: E,
        clear_queue: bool,
        sync: bool,
        timeout_ms: u64,
        args: VariantList,
    ) -> bool {
        debug!(event = ?event, clear_queue, sync, "transition requested");

        let handle = sync.then(|| Arc::new(SyncHandle::new()));
        let record = PendingEvent {
            event: Some(event),
            args,
            entry_point_transition: false,
            sync: handle.clone(),
        };

        {
            let mut queue = self.inner.queue.lock();
            if clear_queue {
                clear_pending(&mut queue);
            }
            queue.push_back(record);
        }

        self.inner.emit();

        match handle {
            Some(handle) => handle.wait(timeout_ms) == EventStatus::DoneOk,
            None => true,
        }
    }

    /// Checks whether `event` would resolve to a transition once every
    /// currently queued event has been applied.
    ///
    /// The queued events are simulated in order against a hypothetical
    /// current state. Guards of queued events are evaluated against the NEW
    /// submission's arguments, not the arguments they were queued with;
    /// this mirrors long-standing behavior that callers depend on.
    ///
    /// Pure query: no callback other than guards runs, nothing is queued.
    pub fn is_transition_possible(&self, event: &E, args: &VariantList) -> bool {
        let queued: Vec<Option<E>> = self
            .inner
            .queue
            .lock()
            .iter()
            .map(|pending| pending.event.clone())
            .collect();

        let graph = self.inner.graph.read();
        let transitions = self.inner.transitions.read();
        let mut from = self.inner.current.read().clone();

        for queued_event in &queued {
            // Entry-point follow-ups carry no event id and cannot be
            // simulated; the query conservatively reports impossible.
            let Some(queued_event) = queued_event else {
                return false;
            };

            match transitions.resolve(&graph, &from, queued_event, args) {
                Some(record) => from = record.to,
                None => return false,
            }
        }

        transitions.resolve(&graph, &from, event, args).is_some()
    }
}

impl<S, E> Drop for HierarchicalStateMachine<S, E> {
    fn drop(&mut self) {
        self.inner.release();
    }
}

impl<S, E> MachineInner<S, E> {
    fn release(&self) {
        self.stop_dispatching.store(true, Ordering::Release);

        if let Some(binding) = self.dispatcher.lock().take() {
            debug!("releasing dispatcher");
            binding.dispatcher.unregister_event_handler(binding.handler_id);
        }
    }

    fn emit(&self) {
        let dispatcher = self
            .dispatcher
            .lock()
            .as_ref()
            .map(|binding| binding.dispatcher.clone());

        match dispatcher {
            Some(dispatcher) => dispatcher.emit_event(),
            None => warn!("no dispatcher attached; event stays queued until one is"),
        }
    }
}

impl<S, E> MachineInner<S, E>
where
    S: StateKey,
    E: EventKey,
{
    /// One dispatch tick: processes the head of the queue and re-arms the
    /// dispatcher while more events are pending.
    fn dispatch_events(&self) {
        if self.stop_dispatching.load(Ordering::Acquire) {
            return;
        }

        let next = self.queue.lock().pop_front();

        if let Some(event) = next {
            trace!(event = ?event.event, synthetic = event.entry_point_transition, "dispatching");
            let status = self.run_transition(&event);
            event.finalize(status);
        }

        if !self.stop_dispatching.load(Ordering::Acquire) && !self.queue.lock().is_empty() {
            self.emit();
        }
    }

    /// Applies one pending event against the current state.
    fn run_transition(&self, event: &PendingEvent<E>) -> EventStatus {
        let current = self.current.read().clone();

        let resolved: Option<TransitionRecord<S>> = if event.entry_point_transition {
            self.graph
                .read()
                .entry_point(&current)
                .map(|to| TransitionRecord {
                    to,
                    action: None,
                    guard: None,
                })
        } else if let Some(event_id) = &event.event {
            let graph = self.graph.read();
            self.transitions
                .read()
                .resolve(&graph, &current, event_id, &event.args)
        } else {
            None
        };

        let Some(transition) = resolved else {
            debug!(event = ?event.event, state = ?current, "event ignored: no transition");
            return EventStatus::DoneFailed;
        };

        if transition.to == current {
            // Self-transition: only the action fires.
            if let Some(action) = &transition.action {
                action(&event.args);
            }
            return EventStatus::DoneOk;
        }

        if !self.invoke_exiting(&current) {
            debug!(state = ?current, "transition aborted: exit rejected");
            return EventStatus::DoneFailed;
        }

        if let Some(action) = &transition.action {
            action(&event.args);
        }

        if !self.invoke_entering(&transition.to, &event.args) {
            debug!(state = ?transition.to, "entry rejected, restoring previous state");
            // The restore is not allowed to reject in turn; its result is
            // ignored to rule out ping-pong between the two states.
            let empty = VariantList::new();
            self.invoke_entering(&current, &empty);
            self.invoke_changed(&current, &empty);
            return EventStatus::DoneFailed;
        }

        *self.current.write() = transition.to.clone();
        self.invoke_changed(&transition.to, &event.args);

        let entry_point = self.graph.read().entry_point(&transition.to);
        if let Some(entry_point) = entry_point {
            debug!(state = ?transition.to, entry_point = ?entry_point, "descending into entry point");

            let follow_up = PendingEvent {
                event: None,
                args: event.args.clone(),
                entry_point_transition: true,
                sync: event.sync.clone(),
            };
            self.queue.lock().push_front(follow_up);

            // The composite transition is not finished; the submitter keeps
            // waiting until the descent reaches a leaf.
            EventStatus::Pending
        } else {
            EventStatus::DoneOk
        }
    }

    fn invoke_exiting(&self, state: &S) -> bool {
        let callback = self.graph.read().exit_callback(state);
        match callback {
            Some(callback) => callback(),
            None => true,
        }
    }

    fn invoke_entering(&self, state: &S, args: &VariantList) -> bool {
        let callback = self.graph.read().enter_callback(state);
        match callback {
            Some(callback) => callback(args),
            None => true,
        }
    }

    fn invoke_changed(&self, state: &S, args: &VariantList) {
        let callback = self.graph.read().changed_callback(state);
        match callback {
            Some(callback) => callback(args),
            None => trace!(state = ?state, "no changed callback registered"),
        }
    }
}
