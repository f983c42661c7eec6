//! Hook invocation and retirement of removed subtrees.
//!
//! # Ordering
//!
//! - Layout effects of a fiber run synchronously when it bubbles, before
//!   its passive effects are even queued.
//! - Passive effects of a fiber go out as one transition. The scheduler
//!   runs transitions FIFO, so across fibers they run in bubble order.
//! - A removed fiber's cleanups run in hook-list order.

use tracing::trace;

use crate::fiber::{FiberId, FiberTree, Lane};
use crate::hooks::Hooks;
use crate::host::Scheduler;

/// Run or schedule the effects a component queued during its last render.
pub(crate) fn invoke_hooks<S: Scheduler>(hooks: &mut Hooks, lane: Lane, scheduler: &mut S) {
    if lane.contains(Lane::REMOVE) {
        hooks.run_cleanups();
        return;
    }

    let layout = hooks.take_layout();
    if !layout.is_empty() {
        layout.run();
    }

    let passive = hooks.take_passive();
    if !passive.is_empty() {
        scheduler.start_transition(Box::new(move || passive.run()));
    }
}

/// Tear down a detached fiber and everything below it.
///
/// Component cleanups run parent-first in document order, then every slot in
/// the subtree is freed. Returns the number of fibers freed.
pub(crate) fn retire<S: Scheduler>(tree: &mut FiberTree, id: FiberId, scheduler: &mut S) -> usize {
    let doomed = tree.subtree(id);

    for &fid in &doomed {
        let fiber = &mut tree[fid];
        if let Some(hooks) = fiber.hooks.as_mut() {
            invoke_hooks(hooks, Lane::REMOVE, scheduler);
        }
    }

    for &fid in &doomed {
        tree.remove(fid);
    }

    trace!(?id, freed = doomed.len(), "retired subtree");
    doomed.len()
}
