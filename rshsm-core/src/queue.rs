//! Pending-event queue.

use crate::sync::{EventStatus, SyncHandle};
use crate::variant::VariantList;
use std::collections::VecDeque;
use std::sync::Arc;

#[cfg(not(feature = "single-threaded"))]
mod guard {
    /// Queue container guard. Thread-safe build: a real mutex.
    pub(crate) struct QueueLock<T>(parking_lot::Mutex<T>);

    impl<T> QueueLock<T> {
        pub fn new(value: T) -> Self {
            Self(parking_lot::Mutex::new(value))
        }

        pub fn lock(&self) -> parking_lot::MutexGuard<'_, T> {
            self.0.lock()
        }
    }
}

#[cfg(feature = "single-threaded")]
mod guard {
    /// Queue container guard. Single-threaded build: a `RefCell`, which
    /// makes the machine `!Sync` so cross-thread misuse cannot compile.
    pub(crate) struct QueueLock<T>(core::cell::RefCell<T>);

    impl<T> QueueLock<T> {
        pub fn new(value: T) -> Self {
            Self(core::cell::RefCell::new(value))
        }

        pub fn lock(&self) -> core::cell::RefMut<'_, T> {
            self.0.borrow_mut()
        }
    }
}

pub(crate) use guard::QueueLock;

pub(crate) type EventQueue<E> = QueueLock<VecDeque<PendingEvent<E>>>;

/// A queued, not-yet-processed submission.
pub(crate) struct PendingEvent<E> {
    /// Submitted event id. `None` for entry-point follow-ups, which carry
    /// no user event of their own.
    pub event: Option<E>,
    pub args: VariantList,
    /// Synthesized by the executor to descend into an entry point. Such
    /// records represent a committed transition and survive queue clears.
    pub entry_point_transition: bool,
    /// Present for synchronous submissions; shared with the submitter.
    pub sync: Option<Arc<SyncHandle>>,
}

impl<E> PendingEvent<E> {
    pub fn finalize(&self, status: EventStatus) {
        if let Some(handle) = &self.sync {
            handle.finalize(status);
        }
    }
}

impl<E> Drop for PendingEvent<E> {
    fn drop(&mut self) {
        // A record dropped as the last owner of a still-pending handle has
        // no executor coming for it; fail it so no waiter is left behind.
        if let Some(handle) = &self.sync {
            if Arc::strong_count(handle) == 1 {
                handle.abandon();
            }
        }
    }
}

/// Fails and removes every clearable record. Entry-point follow-ups stay:
/// they belong to a transition that already passed its exit callback and
/// cannot be interrupted.
pub(crate) fn clear_pending<E>(queue: &mut VecDeque<PendingEvent<E>>) {
    for event in queue.iter() {
        if !event.entry_point_transition {
            if let Some(handle) = &event.sync {
                handle.abandon();
            }
        }
    }

    queue.retain(|event| event.entry_point_transition);
}
