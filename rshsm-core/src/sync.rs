//! Rendez-vous between synchronous submitters and the executor.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Timeout value meaning "wait until the event is finalized".
pub const WAIT_INDEFINITELY: u64 = 0;

/// Processing status of a submitted event.
///
/// The status moves from [`EventStatus::Pending`] to exactly one of the
/// `Done*` values. It stays `Pending` across an entry-point follow-up: the
/// submitter keeps waiting until the descent reaches a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventStatus {
    Pending,
    DoneOk,
    DoneFailed,
}

/// Shared rendez-vous cell, co-owned by a synchronous submitter and the
/// queue record(s) tracking its event.
pub(crate) struct SyncHandle {
    status: Mutex<EventStatus>,
    processed: Condvar,
}

impl SyncHandle {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(EventStatus::Pending),
            processed: Condvar::new(),
        }
    }

    /// Blocks the caller until the status leaves `Pending` or the timeout
    /// elapses. A timeout of [`WAIT_INDEFINITELY`] waits forever.
    ///
    /// Returns the status observed on wakeup; `Pending` means the wait
    /// timed out.
    pub fn wait(&self, timeout_ms: u64) -> EventStatus {
        let mut status = self.status.lock();

        if timeout_ms == WAIT_INDEFINITELY {
            while *status == EventStatus::Pending {
                self.processed.wait(&mut status);
            }
        } else {
            let deadline = Instant::now() + Duration::from_millis(timeout_ms);
            while *status == EventStatus::Pending {
                if self.processed.wait_until(&mut status, deadline).timed_out() {
                    break;
                }
            }
        }

        *status
    }

    /// Publishes the executor's result. `Pending` records an intermediate
    /// step of a composite transition and wakes nobody.
    pub fn finalize(&self, new_status: EventStatus) {
        let mut status = self.status.lock();
        *status = new_status;

        if new_status != EventStatus::Pending {
            self.processed.notify_one();
        }
    }

    /// Fails the event if it is still pending. Used when a queued record is
    /// cleared or dropped before the executor reached it.
    pub fn abandon(&self) {
        let mut status = self.status.lock();

        if *status == EventStatus::Pending {
            *status = EventStatus::DoneFailed;
            self.processed.notify_one();
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> EventStatus {
        *self.status.lock()
    }
}
