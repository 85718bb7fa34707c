//! Crosscap: scoped capture points with explicit cross-thread propagation.
//!
//! # Overview
//!
//! Crosscap lets library code publish and consume *ambient* per-thread
//! capture points (loggers, tracers, metrics collectors, authorization
//! contexts) without threading the object through every call. Two rules make
//! this safe where ad-hoc thread locals are not:
//!
//! - **Scoped lifetime, LIFO override**: a capture is visible only within the
//!   dynamic extent of the scope guard that installed it. A newer scope of
//!   the same capture type shadows an older one until it is dropped.
//! - **Explicit crossing**: a capture installed on thread A becomes visible
//!   to work running on thread B only when the dispatching code opts in with
//!   [`ThreadCrosser::wrap_call`], and only for captures that declared
//!   themselves crossable by installing with [`AutoCrossingCapture`].
//!
//! # Core Guarantees
//!
//! - **Safe in any context**: capture-site calls with no active capture of
//!   that type are silent no-ops
//! - **Type isolation**: installing a capture of one type never changes what
//!   is current for another type
//! - **Snapshot at wrap time**: [`ThreadCrosser::wrap_call`] captures the
//!   crossing environment eagerly; captures installed afterwards never leak
//!   into the wrapped callable
//! - **Destination scopes still win**: scopes installed on the invoking
//!   thread inside the wrapped call shadow the restored environment, so
//!   nesting stays LIFO everywhere
//!
//! # Example
//!
//! ```
//! use crosscap::{current, AutoCrossingCapture, ThreadCrosser};
//! use std::sync::{Arc, Mutex};
//!
//! // A capture shape: an object-safe trait plus a capture-site dispatcher.
//! trait TextLog: Send + Sync {
//!     fn log_line(&self, line: &str);
//! }
//!
//! fn log(line: &str) {
//!     if let Some(capture) = current::<dyn TextLog>() {
//!         capture.log_line(line);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Sink {
//!     lines: Mutex<Vec<String>>,
//! }
//!
//! impl TextLog for Sink {
//!     fn log_line(&self, line: &str) {
//!         self.lines.lock().unwrap().push(line.to_owned());
//!     }
//! }
//!
//! let sink = Arc::new(Sink::default());
//! let _scope = AutoCrossingCapture::<dyn TextLog>::new(sink.clone());
//!
//! log("on the main thread");
//! let call = ThreadCrosser::wrap_call(|| log("on a worker thread"));
//! std::thread::spawn(move || call.call()).join().unwrap();
//!
//! assert_eq!(
//!     *sink.lines.lock().unwrap(),
//!     ["on the main thread", "on a worker thread"]
//! );
//! ```
//!
//! # Module Structure
//!
//! - [`capture`]: per-thread capture stacks, scope guards, manual bridging
//! - [`crosser`]: the crosser registry, snapshots, and the wrap-call primitive
//! - [`tracing_compat`]: feature-gated structured events for capture plumbing
//!
//! The framework introduces no threads, takes no locks, and owns no capture
//! objects; sinks shared across threads serialize their own state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]

pub mod capture;
pub mod crosser;
pub mod tracing_compat;

pub use capture::{
    current, AutoCrossingCapture, CapturePoint, ManualCrossThreads, ScopedCapture, ThreadBridge,
};
pub use crosser::{CrossCall, CrossFn, CrosserSnapshot, ThreadCrosser};
