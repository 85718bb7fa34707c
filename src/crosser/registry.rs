//! The per-thread crosser stack and snapshot restoration.
//!
//! Every [`AutoCrossingCapture`](crate::AutoCrossingCapture) enrolls here by
//! pushing a type-erased [`CrosserNode`] onto the calling thread's crosser
//! stack. The stack spans all capture shapes at once: a node records the
//! shape-specific way to overlay its capture ([`CrossRestore`]) and the node
//! that was on top when it was pushed, which is its parent environment.
//!
//! A [`CrosserSnapshot`] is a handle to the top node at some instant. Nodes
//! are `Arc`-owned, so a snapshot (and any wrapped callable holding one)
//! stays valid even after the scopes that produced it have been dropped on
//! the origin thread; the chain simply keeps the captures alive.
//!
//! Restoring a snapshot walks its chain outermost-first and overlays each
//! node's capture on the calling thread, saving that thread's previous top
//! per shape. The walk order recovers the LIFO order as it existed on the
//! origin thread: the node nearest the snapshot wins for its shape. A final
//! delegate guard makes the snapshot the calling thread's crosser top, so
//! wraps taken inside the restoration snapshot the effective environment.
//! All guards undo in reverse order on every exit path, including unwinds.

use crate::tracing_compat::{debug, trace};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Shape-erased hook that overlays one capture on the calling thread.
///
/// Implemented per capture shape by the auto-crossing guard; the registry
/// never learns the shape, only how to install and undo the overlay.
pub(crate) trait CrossRestore: Send + Sync {
    /// Installs the capture as current for its shape on the calling thread,
    /// returning a guard that restores the previous capture when dropped.
    fn install(&self) -> OverlayGuard;
}

/// One enrolled auto-crossing capture.
pub(crate) struct CrosserNode {
    /// Crosser top of the pushing thread at the moment this node was pushed.
    parent: Option<Arc<CrosserNode>>,
    restore: Box<dyn CrossRestore>,
}

thread_local! {
    /// Topmost live crosser node on this thread, if any.
    static CROSSER_TOP: RefCell<Option<Arc<CrosserNode>>> = const { RefCell::new(None) };
}

/// Undo guard for a single thread-local swap performed during restoration.
///
/// Runs its undo closure exactly once, on drop. Not `Send`: the undo must
/// happen on the thread that performed the swap.
pub(crate) struct OverlayGuard {
    undo: Option<Box<dyn FnOnce()>>,
}

impl OverlayGuard {
    pub(crate) fn new(undo: Box<dyn FnOnce()>) -> Self {
        Self { undo: Some(undo) }
    }
}

impl Drop for OverlayGuard {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            undo();
        }
    }
}

/// Scope guard that keeps one node on the calling thread's crosser stack.
///
/// Pushed on construction, popped on drop. Must be dropped in reverse
/// construction order on its thread, like the capture scope it belongs to.
pub(crate) struct ScopedCrosser {
    node: Arc<CrosserNode>,
    parent: Option<Arc<CrosserNode>>,
    _thread_bound: PhantomData<*const ()>,
}

impl ScopedCrosser {
    pub(crate) fn new(restore: Box<dyn CrossRestore>) -> Self {
        let parent = CROSSER_TOP.with(|top| top.borrow().clone());
        let node = Arc::new(CrosserNode {
            parent: parent.clone(),
            restore,
        });
        CROSSER_TOP.with(|top| *top.borrow_mut() = Some(Arc::clone(&node)));
        trace!("crossing capture enrolled");
        Self {
            node,
            parent,
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for ScopedCrosser {
    fn drop(&mut self) {
        let replaced = CROSSER_TOP.with(|top| {
            let mut top = top.borrow_mut();
            std::mem::replace(&mut *top, self.parent.take())
        });
        trace!("crossing capture withdrawn");
        debug_assert!(
            replaced.is_some_and(|node| Arc::ptr_eq(&node, &self.node)),
            "crossing scopes must be dropped in reverse construction order"
        );
    }
}

/// An immutable handle to a thread's crossing environment at some instant.
///
/// Snapshots are cheap to clone and freely sendable; the nodes they point to
/// are shared, so the captured environment outlives the scopes that produced
/// it for as long as any snapshot (or wrapped callable) holds on to it. An
/// empty snapshot means no auto-crossing capture was active.
#[derive(Clone, Default)]
pub struct CrosserSnapshot {
    top: Option<Arc<CrosserNode>>,
}

impl CrosserSnapshot {
    /// Captures the crossing environment of the calling thread.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            top: CROSSER_TOP.with(|top| top.borrow().clone()),
        }
    }

    /// Returns `true` if no auto-crossing capture was active when the
    /// snapshot was taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of auto-crossing captures in the snapshot chain.
    pub(crate) fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.top.as_ref();
        while let Some(current) = node {
            depth += 1;
            node = current.parent.as_ref();
        }
        depth
    }

    /// Overlays the snapshot's environment on the calling thread for the
    /// lifetime of the returned scope.
    ///
    /// An empty snapshot restores nothing: the callable runs transparently in
    /// the calling thread's own ambient environment.
    pub(crate) fn enter(&self) -> RestorationScope {
        let mut guards = Vec::new();
        if let Some(top) = &self.top {
            let mut chain = Vec::new();
            let mut node = Some(Arc::clone(top));
            while let Some(current) = node {
                node = current.parent.clone();
                chain.push(current);
            }
            guards.reserve(chain.len() + 1);
            // Outermost node first, so the node nearest the snapshot ends up
            // current for its shape.
            for node in chain.iter().rev() {
                guards.push(node.restore.install());
            }
            guards.push(delegate_to(Arc::clone(top)));
            debug!(depth = chain.len(), "crossing environment restored");
        }
        RestorationScope {
            guards,
            _thread_bound: PhantomData,
        }
    }
}

impl fmt::Debug for CrosserSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrosserSnapshot")
            .field("depth", &self.depth())
            .finish()
    }
}

/// Makes `node` the calling thread's crosser top until the guard drops, so
/// wraps taken inside a restoration cross the restored environment again.
fn delegate_to(node: Arc<CrosserNode>) -> OverlayGuard {
    let previous = CROSSER_TOP.with(|top| top.borrow_mut().replace(node));
    OverlayGuard::new(Box::new(move || {
        CROSSER_TOP.with(|top| *top.borrow_mut() = previous);
    }))
}

/// The dynamic extent of one restored snapshot on one thread.
///
/// Dropping unwinds the overlays innermost-first, which re-exposes whatever
/// the thread had current before the restoration, on normal return and on
/// panic alike.
pub(crate) struct RestorationScope {
    guards: Vec<OverlayGuard>,
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for RestorationScope {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}
