//! Arena storage for fibers.

use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::{Fiber, FiberId};

/// Owns every fiber of one root.
///
/// Ids handed out by the tree stay valid until the fiber is retired; after
/// that, lookups return `None` instead of aliasing a newer fiber.
#[derive(Debug, Default)]
pub struct FiberTree {
    fibers: SlotMap<FiberId, Fiber>,
}

impl FiberTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fibers: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn insert(&mut self, fiber: Fiber) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub(crate) fn remove(&mut self, id: FiberId) -> Option<Fiber> {
        self.fibers.remove(id)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.fibers.get(id)
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Children of `id` following the child/sibling links.
    pub fn children(&self, id: FiberId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).and_then(|fiber| fiber.child),
        }
    }

    /// Nearest ancestor that is a host fiber.
    pub fn nearest_host_ancestor(&self, id: FiberId) -> Option<FiberId> {
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            let fiber = self.get(parent)?;
            if !fiber.is_component() {
                return Some(parent);
            }
            current = fiber.parent;
        }
        None
    }

    /// Last host rendered at the top level of `id`, skipping component
    /// boundaries and components that rendered nothing.
    pub fn last_host(&self, id: FiberId) -> Option<FiberId> {
        self.top_hosts(id).pop()
    }

    /// Hosts rendered at the top level of `id`, in document order: `id`
    /// itself for a host fiber, otherwise the top-level hosts of each kid.
    pub fn top_hosts(&self, id: FiberId) -> Vec<FiberId> {
        let mut hosts = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(fiber) = self.get(current) else {
                continue;
            };
            if fiber.is_component() {
                stack.extend(fiber.kids.iter().rev().copied());
            } else {
                hosts.push(current);
            }
        }
        hosts
    }

    /// `id` and everything below it in document order, via `kids`.
    pub fn subtree(&self, id: FiberId) -> Vec<FiberId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(fiber) = self.get(current) else {
                continue;
            };
            order.push(current);
            stack.extend(fiber.kids.iter().rev().copied());
        }
        order
    }
}

impl Index<FiberId> for FiberTree {
    type Output = Fiber;

    fn index(&self, id: FiberId) -> &Fiber {
        &self.fibers[id]
    }
}

impl IndexMut<FiberId> for FiberTree {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber {
        &mut self.fibers[id]
    }
}

/// Iterator over the intrusive sibling chain.
pub struct Children<'a> {
    tree: &'a FiberTree,
    next: Option<FiberId>,
}

impl Iterator for Children<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|fiber| fiber.sibling);
        Some(current)
    }
}
