//! Per-thread capture stacks and the scope guards that feed them.
//!
//! A *capture point* is a user-owned object implementing some object-safe
//! capability trait (a capture *shape*), installed as a scoped observer of
//! events. The capture side of the crate has three pieces:
//!
//! - [`current`]: the capture-site accessor. Returns the innermost live
//!   capture of a shape on the calling thread, or `None` when no capture of
//!   that shape is active.
//! - [`ScopedCapture`] / [`AutoCrossingCapture`]: guards that make a capture
//!   current for their lifetime. The auto-crossing variant additionally
//!   enrolls the capture with the crosser registry so
//!   [`ThreadCrosser::wrap_call`](crate::ThreadCrosser::wrap_call) can
//!   propagate it across threads.
//! - [`ThreadBridge`] / [`ManualCrossThreads`]: a two-part manual alternative
//!   that crosses one capture of one shape, on demand.
//!
//! # Defining a capture shape
//!
//! A shape is a trait with `Send + Sync` supertraits plus a capture-site
//! dispatcher that forwards to [`current`] and treats an absent capture as a
//! no-op:
//!
//! ```
//! use crosscap::current;
//!
//! pub trait CountMetric: Send + Sync {
//!     fn record(&self, value: i64);
//! }
//!
//! pub fn record_count(value: i64) {
//!     if let Some(capture) = current::<dyn CountMetric>() {
//!         capture.record(value);
//!     }
//! }
//! ```
//!
//! Dispatchers built this way are safe to call in any context, which lets
//! library code instrument unconditionally and leave the decision of whether
//! (and where) events land to whoever installs a scope.

pub mod bridge;
pub mod scope;
pub mod stack;

pub use bridge::{ManualCrossThreads, ThreadBridge};
pub use scope::{AutoCrossingCapture, ScopedCapture};
pub use stack::{current, CapturePoint};
