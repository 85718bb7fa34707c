//! Snapshot-and-restore crossing of the ambient capture environment.
//!
//! [`ThreadCrosser::wrap_call`] is the opt-in point for making auto-crossing
//! captures follow work to another thread: it snapshots the calling thread's
//! crossing environment eagerly and returns a [`CrossCall`] that, wherever
//! and whenever it is invoked, overlays that environment for the duration of
//! the callable. Invocations compose with the destination thread's own
//! scopes: anything installed inside the call still shadows the restored
//! state, and further wraps taken inside the call snapshot the effective
//! environment.
//!
//! Wrapping is eager but restoration is per-invocation: one wrapped callable
//! can be cloned and invoked from any number of threads, concurrently, each
//! invocation restoring the same snapshot independently.
//!
//! A wrap taken while no auto-crossing capture is active yields a
//! transparent callable: invoking it runs the callable in the destination
//! thread's own ambient environment, whatever that happens to be.

pub(crate) mod registry;

pub use registry::CrosserSnapshot;

use crate::tracing_compat::debug;
use std::fmt;
use std::sync::Arc;

/// Entry points for wrapping callables with the crossing environment.
///
/// The type is a namespace; it has no instances.
pub struct ThreadCrosser {
    _private: (),
}

impl ThreadCrosser {
    /// Wraps a callback with the crossing environment of the calling thread.
    ///
    /// The snapshot is taken now, not at invoke time: auto-crossing captures
    /// installed after wrapping are not visible through the returned call.
    /// Plain (non-crossing) scopes never propagate through a wrap.
    ///
    /// Wrapping is idempotent in the useful sense: wrapping a closure that
    /// just invokes an already-wrapped call restores the inner snapshot
    /// innermost, so the observable behavior matches the inner call alone.
    pub fn wrap_call<F>(call: F) -> CrossCall
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::wrap_function(call)
    }

    /// Wraps a value-returning callable with the crossing environment of the
    /// calling thread.
    ///
    /// Semantics are those of [`wrap_call`](Self::wrap_call); the return
    /// value is handed back from whichever thread invokes the wrapped
    /// callable.
    pub fn wrap_function<R, F>(function: F) -> CrossFn<R>
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        let snapshot = CrosserSnapshot::capture();
        debug!(depth = snapshot.depth(), "callable wrapped");
        CrossFn {
            snapshot,
            call: Arc::new(function),
        }
    }

    /// Wraps an optional callable, preserving absence.
    ///
    /// `None` wraps to `None` without taking a snapshot, so an absent
    /// callback stays absent no matter what captures are installed before or
    /// after.
    pub fn wrap_opt<R, F>(call: Option<F>) -> Option<CrossFn<R>>
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        call.map(Self::wrap_function)
    }
}

/// A callable bound to the crossing environment captured when it was wrapped.
///
/// Cheap to clone (clones share the snapshot and the callable) and freely
/// sendable; every invocation establishes its own restoration scope, so a
/// single `CrossFn` may be invoked concurrently from several threads. The
/// restoration is unwound on every exit path: a panic in the callable
/// propagates, with the destination thread's environment restored first.
pub struct CrossFn<R = ()> {
    snapshot: CrosserSnapshot,
    call: Arc<dyn Fn() -> R + Send + Sync>,
}

/// A wrapped callback with no return value, as produced by
/// [`ThreadCrosser::wrap_call`].
pub type CrossCall = CrossFn<()>;

impl<R> CrossFn<R> {
    /// Invokes the callable with its wrap-time environment restored on the
    /// calling thread.
    pub fn call(&self) -> R {
        let _restoration = self.snapshot.enter();
        (self.call)()
    }

    /// Returns `true` if the wrap captured at least one auto-crossing
    /// capture; a transparent callable runs in the invoking thread's own
    /// environment instead.
    #[must_use]
    pub fn is_crossing(&self) -> bool {
        !self.snapshot.is_empty()
    }
}

impl<R> Clone for CrossFn<R> {
    fn clone(&self) -> Self {
        Self {
            snapshot: self.snapshot.clone(),
            call: Arc::clone(&self.call),
        }
    }
}

impl<R> fmt::Debug for CrossFn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossFn")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}
