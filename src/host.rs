//! Collaborator contracts - what the reconciler needs from its host.
//!
//! - [`Scheduler`]: queues work units, decides when to yield, runs
//!   low-priority transitions in FIFO order
//! - [`Renderer`]: creates a node handle the first time a host fiber is visited
//! - [`Commit`]: applies a finished work unit
//!
//! Mutating, moving and removing handles all happen inside [`Commit`]; the
//! reconciler itself only creates them.

use crate::element::Props;
use crate::fiber::{FiberId, FiberTree, NodeHandle};
use crate::reconciler::{FinishedWork, WorkUnit};

/// Deferred low-priority callback.
pub type Transition = Box<dyn FnOnce()>;

// =============================================================================
// Scheduler
// =============================================================================

/// Cooperative scheduler driving work units.
pub trait Scheduler {
    /// Enqueue a unit. A unit that has already started is a continuation and
    /// must run before any unit that has not.
    fn schedule(&mut self, unit: WorkUnit);

    /// Polled before every fiber visit.
    fn should_yield(&mut self) -> bool;

    /// Enqueue a low-priority callback, preserving enqueue order.
    fn start_transition(&mut self, callback: Transition);

    /// Next unit to perform.
    fn next_unit(&mut self) -> Option<WorkUnit>;

    /// Next transition to run once no unit is pending.
    fn next_transition(&mut self) -> Option<Transition>;

    /// Called when the driver starts a new time slice.
    fn begin_slice(&mut self) {}
}

// =============================================================================
// Renderer
// =============================================================================

/// What the renderer sees of a host fiber on creation.
#[derive(Debug, Clone, Copy)]
pub struct HostInstance<'a> {
    pub fiber: FiberId,
    pub tag: &'a str,
    pub props: &'a Props,
    /// Create in the SVG namespace.
    pub svg: bool,
}

/// Produces node handles for host fibers.
pub trait Renderer {
    fn create_handle(&mut self, host: &HostInstance<'_>) -> NodeHandle;
}

impl<F> Renderer for F
where
    F: FnMut(&HostInstance<'_>) -> NodeHandle,
{
    fn create_handle(&mut self, host: &HostInstance<'_>) -> NodeHandle {
        self(host)
    }
}

// =============================================================================
// Commit
// =============================================================================

/// Applies a finished work unit.
///
/// Walk [`FinishedWork::effects`] for host create/update/move using each
/// fiber's `node`, `last_props` and `lane`, then [`FinishedWork::detached`]
/// for removals. Detached fibers are still readable here; the reconciler
/// retires them right after this call returns.
///
/// A host fiber's `node_ref`, if any, expects its node once the node is
/// attached (fresh or moved) and `None` once its fiber is detached.
pub trait Commit {
    fn commit(&mut self, tree: &FiberTree, work: &FinishedWork);
}

impl<F> Commit for F
where
    F: FnMut(&FiberTree, &FinishedWork),
{
    fn commit(&mut self, tree: &FiberTree, work: &FinishedWork) {
        self(tree, work)
    }
}
