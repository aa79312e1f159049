//! # rshsm-dispatch
//!
//! Dispatcher back-ends for rshsm machines.
//!
//! This crate provides:
//! - [`ThreadDispatcher`]: a portable dispatcher owning a dedicated worker
//!   thread, for applications without an event loop of their own
//! - [`TokioDispatcher`]: a dispatcher running as a task on a Tokio runtime
//!
//! Both conform to the [`EventDispatcher`](rshsm_core::EventDispatcher)
//! contract: serial handler rounds, coalesced wakeups, `emit_event` callable
//! from any thread. A single dispatcher may drive several machines.

pub mod runtime;
pub mod thread;

pub use runtime::TokioDispatcher;
pub use thread::ThreadDispatcher;
