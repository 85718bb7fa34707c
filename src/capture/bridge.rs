//! Manual, single-shape thread crossing.
//!
//! Automatic crossing snapshots every enrolled capture at wrap time. The
//! bridge is the narrow alternative: it carries exactly one shape's current
//! capture, captured when the bridge is constructed on the origin thread,
//! and installs it on whichever thread constructs a [`ManualCrossThreads`]
//! guard from it. No crosser registry involvement, no wrapping.

use super::stack::{self, CapturePoint};
use crate::tracing_compat::trace;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Carries the origin thread's current `T` capture to other threads.
///
/// The bridge is a plain value: clone it, send it, share it between several
/// destination threads at once. It records whatever was current for `T` when
/// it was constructed, possibly nothing, in which case installing the
/// bridge masks the destination's own `T` capture for the guard's extent.
pub struct ThreadBridge<T: ?Sized + CapturePoint> {
    capture: Option<Arc<T>>,
}

impl<T: ?Sized + CapturePoint> ThreadBridge<T> {
    /// Captures the calling thread's current `T` capture.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capture: stack::current::<T>(),
        }
    }

    /// Returns `true` if the bridge carries a capture.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.capture.is_some()
    }
}

impl<T: ?Sized + CapturePoint> Default for ThreadBridge<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + CapturePoint> Clone for ThreadBridge<T> {
    fn clone(&self) -> Self {
        Self {
            capture: self.capture.clone(),
        }
    }
}

impl<T: ?Sized + CapturePoint> fmt::Debug for ThreadBridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadBridge")
            .field("shape", &type_name::<T>())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Makes a bridged capture current for `T` on the constructing thread.
///
/// Behaves like a [`ScopedCapture`](crate::ScopedCapture) pointing at the
/// origin thread's capture: the destination's previous `T` top is hidden
/// until the guard drops, and drops must stay LIFO with other scopes on the
/// destination thread.
#[must_use = "the bridged capture is only current while the guard is alive"]
pub struct ManualCrossThreads<T: ?Sized + CapturePoint> {
    installed: Option<Arc<T>>,
    previous: Option<Arc<T>>,
    _thread_bound: PhantomData<*const ()>,
}

impl<T: ?Sized + CapturePoint> ManualCrossThreads<T> {
    /// Installs the bridge's capture (or its absence) as current for `T` on
    /// the calling thread.
    pub fn new(bridge: &ThreadBridge<T>) -> Self {
        let previous = stack::swap_current(bridge.capture.clone());
        trace!(capture_type = type_name::<T>(), "bridged capture installed");
        Self {
            installed: bridge.capture.clone(),
            previous,
            _thread_bound: PhantomData,
        }
    }
}

impl<T: ?Sized + CapturePoint> Drop for ManualCrossThreads<T> {
    fn drop(&mut self) {
        let replaced = stack::swap_current(self.previous.take());
        trace!(capture_type = type_name::<T>(), "bridged capture removed");
        debug_assert!(
            match (&replaced, &self.installed) {
                (Some(top), Some(installed)) => Arc::ptr_eq(top, installed),
                (None, None) => true,
                _ => false,
            },
            "bridged capture scope for {} dropped out of construction order",
            type_name::<T>()
        );
    }
}

impl<T: ?Sized + CapturePoint> fmt::Debug for ManualCrossThreads<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualCrossThreads")
            .field("shape", &type_name::<T>())
            .field("active", &self.installed.is_some())
            .finish()
    }
}
