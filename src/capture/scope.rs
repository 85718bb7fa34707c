//! Scope guards that make a capture current for their lifetime.
//!
//! Both guards are pure stack-frame objects: construction pushes, drop pops,
//! and the previous top is hidden rather than destroyed, so popping restores
//! it (LIFO override). Guards are thread-bound and must be dropped in
//! reverse construction order on their thread; dropping out of order is a
//! programming error, detected with a `debug_assert!` identity check.

use super::stack::{self, CapturePoint};
use crate::crosser::registry::{CrossRestore, OverlayGuard, ScopedCrosser};
use crate::tracing_compat::trace;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Makes a capture the current one for shape `T` on the constructing thread.
///
/// The capture is visible to [`current`](crate::current) only within the
/// guard's dynamic extent, and only on this thread; see
/// [`AutoCrossingCapture`] for captures that should follow wrapped callables
/// to other threads, and [`ThreadBridge`](crate::ThreadBridge) for one-shot
/// manual crossing.
#[must_use = "the capture is only current while the scope guard is alive"]
pub struct ScopedCapture<T: ?Sized + CapturePoint> {
    capture: Arc<T>,
    previous: Option<Arc<T>>,
    _thread_bound: PhantomData<*const ()>,
}

impl<T: ?Sized + CapturePoint> ScopedCapture<T> {
    /// Installs `capture` as current for shape `T` on the calling thread.
    pub fn new(capture: Arc<T>) -> Self {
        let previous = stack::swap_current(Some(Arc::clone(&capture)));
        trace!(capture_type = type_name::<T>(), "capture scope installed");
        Self {
            capture,
            previous,
            _thread_bound: PhantomData,
        }
    }

    /// The capture this scope hides, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Arc<T>> {
        self.previous.as_ref()
    }
}

impl<T: ?Sized + CapturePoint> Drop for ScopedCapture<T> {
    fn drop(&mut self) {
        let replaced = stack::swap_current(self.previous.take());
        trace!(capture_type = type_name::<T>(), "capture scope removed");
        debug_assert!(
            replaced.is_some_and(|top| Arc::ptr_eq(&top, &self.capture)),
            "capture scopes for {} must be dropped in reverse construction order",
            type_name::<T>()
        );
    }
}

impl<T: ?Sized + CapturePoint> fmt::Debug for ScopedCapture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCapture")
            .field("shape", &type_name::<T>())
            .field("overrides", &self.previous.is_some())
            .finish()
    }
}

/// A [`ScopedCapture`] that additionally enrolls with the crosser registry.
///
/// While the guard is alive, [`ThreadCrosser::wrap_call`] snapshots taken on
/// this thread include the capture, so invoking the wrapped callable on
/// another thread makes it current there for the duration of the call. The
/// capture is therefore reachable from several threads at once and must
/// serialize its own state.
///
/// [`ThreadCrosser::wrap_call`]: crate::ThreadCrosser::wrap_call
#[must_use = "the capture is only current while the scope guard is alive"]
pub struct AutoCrossingCapture<T: ?Sized + CapturePoint> {
    scope: ScopedCapture<T>,
    _crosser: ScopedCrosser,
}

impl<T: ?Sized + CapturePoint> AutoCrossingCapture<T> {
    /// Installs `capture` as current for shape `T` and enrolls it for
    /// automatic crossing.
    pub fn new(capture: Arc<T>) -> Self {
        // Enroll first: the node records the crossing environment as it was
        // before this capture, which is what a restoration must rebuild
        // underneath it.
        let crosser = ScopedCrosser::new(Box::new(SharedRestore {
            capture: Arc::clone(&capture),
        }));
        let scope = ScopedCapture::new(capture);
        Self {
            scope,
            _crosser: crosser,
        }
    }

    /// The capture this scope hides, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Arc<T>> {
        self.scope.previous()
    }
}

impl<T: ?Sized + CapturePoint> fmt::Debug for AutoCrossingCapture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoCrossingCapture")
            .field("shape", &type_name::<T>())
            .field("overrides", &self.scope.previous.is_some())
            .finish()
    }
}

/// Shape-aware restore hook handed to the crosser registry.
///
/// Installation mirrors what `ScopedCapture::new` does, except the previous
/// top belongs to whatever thread is restoring, so it lives in the undo
/// closure instead of a guard frame.
struct SharedRestore<T: ?Sized + CapturePoint> {
    capture: Arc<T>,
}

impl<T: ?Sized + CapturePoint> CrossRestore for SharedRestore<T> {
    fn install(&self) -> OverlayGuard {
        let installed = Arc::clone(&self.capture);
        let previous = stack::swap_current(Some(Arc::clone(&self.capture)));
        OverlayGuard::new(Box::new(move || {
            let replaced = stack::swap_current(previous);
            debug_assert!(
                replaced.is_some_and(|top| Arc::ptr_eq(&top, &installed)),
                "restored capture overlay for {} unwound out of order",
                type_name::<T>()
            );
        }))
    }
}
