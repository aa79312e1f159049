//! Dispatcher backed by a dedicated worker thread.

use parking_lot::{Condvar, Mutex};
use rshsm_core::{EventDispatcher, EventHandler, HandlerId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Portable dispatcher that owns its loop thread.
///
/// [`start`](EventDispatcher::start) spawns the worker; every
/// [`emit_event`](EventDispatcher::emit_event) wakes it for one handler
/// round. Emits arriving while a round is running coalesce into a single
/// follow-up round. Handlers run serially on the worker and must not
/// register or unregister handlers on this dispatcher from within a round.
pub struct ThreadDispatcher {
    shared: Arc<DispatcherShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Default)]
struct LoopSignal {
    pending: bool,
    stop: bool,
}

struct DispatcherShared {
    handlers: Mutex<HashMap<HandlerId, EventHandler>>,
    next_handler_id: AtomicI64,
    signal: Mutex<LoopSignal>,
    wakeup: Condvar,
}

impl DispatcherShared {
    fn run(&self) {
        debug!("dispatcher worker started");

        loop {
            {
                let mut signal = self.signal.lock();
                while !signal.pending && !signal.stop {
                    self.wakeup.wait(&mut signal);
                }
                if signal.stop {
                    break;
                }
                signal.pending = false;
            }

            // Holding the handler table for the whole round guarantees that
            // an unregistered handler is never invoked once
            // unregister_event_handler returned.
            let handlers = self.handlers.lock();
            for handler in handlers.values() {
                handler();
            }
        }

        debug!("dispatcher worker stopped");
    }
}

impl ThreadDispatcher {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(DispatcherShared {
                handlers: Mutex::new(HashMap::new()),
                next_handler_id: AtomicI64::new(0),
                signal: Mutex::new(LoopSignal::default()),
                wakeup: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }
}

impl Default for ThreadDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher for ThreadDispatcher {
    fn start(&self) -> bool {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return true;
        }

        let shared = self.shared.clone();
        let spawned = std::thread::Builder::new()
            .name("rshsm-dispatch".to_string())
            .spawn(move || shared.run());

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                true
            }
            Err(e) => {
                warn!("failed to spawn dispatcher worker: {}", e);
                false
            }
        }
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
        let mut signal = self.shared.signal.lock();
        signal.pending = true;
        self.shared.wakeup.notify_one();
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        {
            let mut signal = self.shared.signal.lock();
            signal.stop = true;
        }
        self.shared.wakeup.notify_all();

        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}
