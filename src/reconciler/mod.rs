//! Reconciler - the context owning one root's fiber tree.
//!
//! All state of a reconciliation lives here or in the [`WorkUnit`] being
//! performed; nothing is process-wide, so independent roots never interfere.
//!
//! # Flow
//!
//! ```text
//! update(fiber) ──▶ mark DIRTY, schedule WorkUnit
//! work_loop()   ──▶ perform(unit) ──▶ step, step, step ... ──▶ yield? ──▶ reschedule
//!                                                        └──▶ boundary done ──▶ commit
//!                                                                           └──▶ retire detached
//!               ──▶ run transitions (passive effects)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut root = create_root(NodeHandle(0), renderer, FrameScheduler::default(), commit);
//! root.render(Element::component(&app));
//! while root.work_loop() == WorkStatus::Yielded {
//!     // wait for the next frame
//! }
//! ```

mod diff;
mod effects;
mod walker;
mod work;

pub use diff::DiffStats;
pub use work::{ChainIter, FinishedWork, WorkUnit};

use std::rc::Rc;

use tracing::debug;

use crate::config::ReconcilerConfig;
use crate::element::{Element, ROOT_TAG};
use crate::error::{ReconcileError, Result};
use crate::fiber::{Fiber, FiberId, FiberTree, Lane, NodeHandle};
use crate::host::{Commit, Renderer, Scheduler};

use walker::Walker;

/// Outcome of one [`Reconciler::work_loop`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing left to do.
    Idle,
    /// A unit was interrupted and rescheduled.
    Yielded,
}

// =============================================================================
// Reconciler
// =============================================================================

/// One root and the collaborators it drives.
pub struct Reconciler<R, S, C> {
    tree: FiberTree,
    container: NodeHandle,
    root: Option<FiberId>,
    renderer: R,
    scheduler: S,
    commit: C,
    passes: u64,
}

/// Create a root rendering into `container`.
pub fn create_root<R, S, C>(container: NodeHandle, renderer: R, scheduler: S, commit: C) -> Reconciler<R, S, C>
where
    R: Renderer,
    S: Scheduler,
    C: Commit,
{
    Reconciler::new(container, renderer, scheduler, commit)
}

/// Create a root and schedule the initial mount of `element` into it.
pub fn render<R, S, C>(
    element: Element,
    container: NodeHandle,
    renderer: R,
    scheduler: S,
    commit: C,
) -> Reconciler<R, S, C>
where
    R: Renderer,
    S: Scheduler,
    C: Commit,
{
    let mut root = Reconciler::new(container, renderer, scheduler, commit);
    root.render(element);
    root
}

impl<R, S, C> Reconciler<R, S, C>
where
    R: Renderer,
    S: Scheduler,
    C: Commit,
{
    pub fn new(container: NodeHandle, renderer: R, scheduler: S, commit: C) -> Self {
        Self {
            tree: FiberTree::new(),
            container,
            root: None,
            renderer,
            scheduler,
            commit,
            passes: 0,
        }
    }

    /// Like [`Reconciler::new`], with validated settings.
    pub fn with_config(
        config: &ReconcilerConfig,
        container: NodeHandle,
        renderer: R,
        scheduler: S,
        commit: C,
    ) -> Result<Self> {
        config.validate()?;
        let mut reconciler = Self::new(container, renderer, scheduler, commit);
        reconciler.tree = FiberTree::with_capacity(config.initial_capacity);
        Ok(reconciler)
    }

    /// Render `element` as the single child of the root.
    ///
    /// The first call builds the synthetic root fiber; later calls replace
    /// its child descriptor and request an update of the whole tree.
    pub fn render(&mut self, element: Element) -> FiberId {
        let children: Rc<[Element]> = Rc::from(vec![element]);

        let root = match self.root {
            Some(root) => {
                self.tree[root].children = children;
                root
            }
            None => {
                let mut fiber = Fiber::from_element(Element::host(ROOT_TAG));
                fiber.children = children;
                fiber.node = Some(self.container);
                let root = self.tree.insert(fiber);
                self.root = Some(root);
                root
            }
        };

        // The root is live by construction, so this cannot be stale.
        let _ = self.update(root);
        root
    }

    /// Request reconciliation of the subtree rooted at `fiber`.
    ///
    /// Returns `Ok(false)` when the request was absorbed because `fiber` is
    /// already the boundary of a queued or in-flight unit.
    pub fn update(&mut self, fiber: FiberId) -> Result<bool> {
        let target = self
            .tree
            .get_mut(fiber)
            .ok_or(ReconcileError::StaleFiber(fiber))?;

        if target.lane.is_dirty() {
            debug!(?fiber, "update coalesced");
            return Ok(false);
        }

        target.lane |= Lane::DIRTY;
        self.scheduler.schedule(WorkUnit::new(fiber));
        debug!(?fiber, "update scheduled");
        Ok(true)
    }

    /// Request reconciliation of the whole tree.
    pub fn rerender(&mut self) -> Result<bool> {
        let root = self.root.ok_or(ReconcileError::NotMounted)?;
        self.update(root)
    }

    /// Advance `unit` until it completes or the scheduler asks to yield.
    ///
    /// Returns the continuation when interrupted; completion commits.
    pub fn perform(&mut self, mut unit: WorkUnit) -> Option<WorkUnit> {
        if !unit.started {
            let boundary = unit.boundary();
            let Some(fiber) = self.tree.get_mut(boundary) else {
                debug!(?boundary, "dropping unit for retired fiber");
                return None;
            };
            fiber.lane = (fiber.lane & Lane::SVG) | Lane::UPDATE | Lane::DIRTY;
            unit.started = true;
            unit.cursor = Some(boundary);
            debug!(?boundary, "unit started");
        }

        while let Some(wip) = unit.cursor {
            if self.scheduler.should_yield() {
                debug!(
                    boundary = ?unit.boundary(),
                    visited = unit.visited,
                    "unit yielded"
                );
                return Some(unit);
            }

            let mut walker = Walker {
                tree: &mut self.tree,
                renderer: &mut self.renderer,
                scheduler: &mut self.scheduler,
                unit: &mut unit,
            };
            let next = walker.step(wip);
            unit.cursor = next;
        }

        self.complete(unit.finish());
        None
    }

    /// Drain the scheduler for one time slice.
    ///
    /// Passive effects queued as transitions run only once no unit is left.
    pub fn work_loop(&mut self) -> WorkStatus {
        self.scheduler.begin_slice();

        while let Some(unit) = self.scheduler.next_unit() {
            if let Some(continuation) = self.perform(unit) {
                self.scheduler.schedule(continuation);
                return WorkStatus::Yielded;
            }
        }

        while let Some(transition) = self.scheduler.next_transition() {
            transition();
        }
        WorkStatus::Idle
    }

    /// Run work loops until idle.
    pub fn flush(&mut self) {
        while self.work_loop() == WorkStatus::Yielded {}
    }

    fn complete(&mut self, finished: FinishedWork) {
        debug!(
            root = ?finished.root(),
            effects = finished.effect_count(),
            detached = finished.detach_count(),
            "committing"
        );
        self.commit.commit(&self.tree, &finished);

        let detached: Vec<FiberId> = finished.detached(&self.tree).collect();
        for id in detached {
            effects::retire(&mut self.tree, id, &mut self.scheduler);
        }
        self.passes += 1;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tree(&self) -> &FiberTree {
        &self.tree
    }

    /// The synthetic root fiber, once something was rendered.
    pub fn root(&self) -> Option<FiberId> {
        self.root
    }

    pub fn container(&self) -> NodeHandle {
        self.container
    }

    /// Completed (committed) units so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn committer(&self) -> &C {
        &self.commit
    }

    pub fn committer_mut(&mut self) -> &mut C {
        &mut self.commit
    }
}
