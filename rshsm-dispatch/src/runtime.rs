//! Dispatcher backed by a task on a Tokio runtime.

use parking_lot::Mutex;
use rshsm_core::{EventDispatcher, EventHandler, HandlerId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Dispatcher that integrates machines into a Tokio application.
///
/// [`start`](EventDispatcher::start) must be called from within a runtime;
/// it spawns a task that sleeps on a [`Notify`] and runs one handler round
/// per wakeup. `Notify` keeps a single stored permit, so emits arriving
/// between rounds coalesce exactly like a native loop wakeup.
///
/// Handler rounds run synchronously on a runtime worker thread. State
/// callbacks should stay short; machines with long-running callbacks belong
/// on a [`ThreadDispatcher`](crate::ThreadDispatcher).
pub struct TokioDispatcher {
    shared: Arc<TokioShared>,
    started: AtomicBool,
}

struct TokioShared {
    handlers: Mutex<HashMap<HandlerId, EventHandler>>,
    next_handler_id: AtomicI64,
    wakeup: Notify,
    stop: AtomicBool,
}

impl TokioDispatcher {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(TokioShared {
                handlers: Mutex::new(HashMap::new()),
                next_handler_id: AtomicI64::new(0),
                wakeup: Notify::new(),
                stop: AtomicBool::new(false),
            }),
            started: AtomicBool::new(false),
        }
    }
}

impl Default for TokioDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher for TokioDispatcher {
    fn start(&self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return true;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("start() requires a running tokio runtime");
                self.started.store(false, Ordering::Release);
                return false;
            }
        };

        let shared = self.shared.clone();
        handle.spawn(async move {
            debug!("dispatcher task started");

            loop {
                shared.wakeup.notified().await;
                if shared.stop.load(Ordering::Acquire) {
                    break;
                }

                let handlers = shared.handlers.lock();
                for handler in handlers.values() {
                    handler();
                }
            }

            debug!("dispatcher task stopped");
        });

        true
    }

    fn register_event_handler(&self, handler: EventHandler) -> HandlerId {
        let id = self.shared.next_handler_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.shared.handlers.lock().insert(id, handler);
        debug!(handler_id = id, "registered event handler");
        id
    }

    fn unregister_event_handler(&self, handler_id: HandlerId) {
        self.shared.handlers.lock().remove(&handler_id);
        debug!(handler_id, "unregistered event handler");
    }

    fn emit_event(&self) {
        self.shared.wakeup.notify_one();
    }
}

impl Drop for TokioDispatcher {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.wakeup.notify_one();
    }
}
