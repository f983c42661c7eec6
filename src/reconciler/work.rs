//! Work units - the resumable state of one reconciliation pass.
//!
//! A unit is plain data: the boundary fiber, the walker's position, and the
//! two chains collected so far. Yielding hands the unit back to the scheduler
//! and resuming feeds it into `Reconciler::perform` again.

use crate::fiber::{FiberId, FiberTree};

/// Head and tail of a singly-linked list threaded through fibers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Chain {
    pub head: Option<FiberId>,
    pub tail: Option<FiberId>,
    pub len: usize,
}

#[derive(Debug, Clone, Copy)]
enum Link {
    Effect,
    Detach,
}

impl Link {
    fn slot(self, tree: &mut FiberTree, id: FiberId) -> &mut Option<FiberId> {
        match self {
            Link::Effect => &mut tree[id].next_effect,
            Link::Detach => &mut tree[id].next_detach,
        }
    }

    fn next(self, tree: &FiberTree, id: FiberId) -> Option<FiberId> {
        let fiber = tree.get(id)?;
        match self {
            Link::Effect => fiber.next_effect,
            Link::Detach => fiber.next_detach,
        }
    }
}

impl Chain {
    fn push(&mut self, tree: &mut FiberTree, id: FiberId, link: Link) {
        *link.slot(tree, id) = None;
        match self.tail {
            Some(tail) => *link.slot(tree, tail) = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }
}

// =============================================================================
// WorkUnit
// =============================================================================

/// One scheduled reconciliation of the subtree rooted at `boundary`.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    boundary: FiberId,
    pub(crate) cursor: Option<FiberId>,
    pub(crate) started: bool,
    effects: Chain,
    detached: Chain,
    pub(crate) visited: usize,
}

impl WorkUnit {
    pub(crate) fn new(boundary: FiberId) -> Self {
        Self {
            boundary,
            cursor: None,
            started: false,
            effects: Chain::default(),
            detached: Chain::default(),
            visited: 0,
        }
    }

    /// Root of the dirty subtree.
    pub fn boundary(&self) -> FiberId {
        self.boundary
    }

    /// True once the walker has visited at least one fiber; such a unit is
    /// a continuation.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Fiber the walker will capture next.
    pub fn position(&self) -> Option<FiberId> {
        self.cursor
    }

    /// Fibers captured so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub(crate) fn push_effect(&mut self, tree: &mut FiberTree, id: FiberId) {
        self.effects.push(tree, id, Link::Effect);
    }

    pub(crate) fn push_detach(&mut self, tree: &mut FiberTree, id: FiberId) {
        self.detached.push(tree, id, Link::Detach);
    }

    pub(crate) fn finish(self) -> FinishedWork {
        FinishedWork {
            root: self.boundary,
            effects: self.effects,
            detached: self.detached,
        }
    }
}

// =============================================================================
// FinishedWork
// =============================================================================

/// A completed unit, ready for commit.
#[derive(Debug, Clone)]
pub struct FinishedWork {
    root: FiberId,
    effects: Chain,
    detached: Chain,
}

impl FinishedWork {
    /// The boundary fiber whose subtree was reconciled.
    pub fn root(&self) -> FiberId {
        self.root
    }

    /// Host fibers touched by the pass, in traversal order.
    pub fn effects<'t>(&self, tree: &'t FiberTree) -> ChainIter<'t> {
        ChainIter {
            tree,
            next: self.effects.head,
            link: Link::Effect,
        }
    }

    /// Removed fibers, in the order they were unlinked.
    pub fn detached<'t>(&self, tree: &'t FiberTree) -> ChainIter<'t> {
        ChainIter {
            tree,
            next: self.detached.head,
            link: Link::Detach,
        }
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len
    }

    pub fn detach_count(&self) -> usize {
        self.detached.len
    }
}

/// Iterator over an effect or detach chain.
pub struct ChainIter<'t> {
    tree: &'t FiberTree,
    next: Option<FiberId>,
    link: Link,
}

impl Iterator for ChainIter<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let current = self.next?;
        self.next = self.link.next(self.tree, current);
        Some(current)
    }
}
