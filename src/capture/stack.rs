//! Per-thread, per-shape storage for the current capture.
//!
//! Conceptually every capture shape `T` has one stack per thread; this module
//! stores only the top of each stack, keyed by the shape's `TypeId` in a
//! single thread-local map. Each scope guard keeps the previous top alive in
//! its own frame, so the full stack is the chain of live guards and a pop is
//! a single swap. Reads never lock: all state is thread-local, and the
//! crossing machinery only ever mutates the map of the thread it runs on.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Marker bound for capture shapes.
///
/// A capture shape must be `Send + Sync + 'static` because auto-crossing and
/// bridging make the installed `Arc` reachable from other threads. The trait
/// is blanket-implemented; it exists to name the bound, not to be implemented
/// by hand. Object-safe traits qualify through their trait objects
/// (`dyn TextLog` style) provided they declare `Send + Sync` supertraits.
pub trait CapturePoint: Send + Sync + 'static {}

impl<T> CapturePoint for T where T: ?Sized + Send + Sync + 'static {}

thread_local! {
    /// Current top capture per shape for this thread.
    ///
    /// Values are always `Arc<T>` for the `TypeId` they are keyed under.
    static CURRENT_CAPTURES: RefCell<HashMap<TypeId, Box<dyn Any>>> =
        RefCell::new(HashMap::new());
}

/// Returns the current capture of shape `T` on the calling thread, if any.
///
/// This is the capture-site accessor: the innermost live scope for `T` wins,
/// including scopes overlaid by an active crossing restoration. Capture-site
/// dispatchers must treat `None` as a silent no-op so instrumented code is
/// safe to run in any context.
#[must_use]
pub fn current<T>() -> Option<Arc<T>>
where
    T: ?Sized + CapturePoint,
{
    CURRENT_CAPTURES.with(|captures| {
        captures.borrow().get(&TypeId::of::<T>()).map(|entry| {
            entry
                .downcast_ref::<Arc<T>>()
                .expect("capture stack entry does not match its shape key")
                .clone()
        })
    })
}

/// Replaces the current capture of shape `T` on the calling thread, returning
/// the previous one.
///
/// `None` clears the slot, which masks the shape entirely until the swap is
/// undone. Callers (the scope guards and the restoration overlay) must undo
/// their swaps in reverse order.
pub(crate) fn swap_current<T>(next: Option<Arc<T>>) -> Option<Arc<T>>
where
    T: ?Sized + CapturePoint,
{
    let previous = CURRENT_CAPTURES.with(|captures| {
        let mut captures = captures.borrow_mut();
        match next {
            Some(capture) => captures.insert(TypeId::of::<T>(), Box::new(capture)),
            None => captures.remove(&TypeId::of::<T>()),
        }
    });
    // The returned Arc is dropped by the caller, outside the map borrow.
    previous.map(|entry| {
        *entry
            .downcast::<Arc<T>>()
            .expect("capture stack entry does not match its shape key")
    })
}
