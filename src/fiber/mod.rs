//! Fiber tree - one reconciliation node per rendered element.
//!
//! Fibers live in an arena and link to each other by id:
//!
//! ```text
//! parent ──child──▶ first ──sibling──▶ second ──sibling──▶ third
//!    ▲                │                  │                  │
//!    └─────parent─────┴──────────────────┴──────────────────┘
//! ```
//!
//! Because the links are plain ids, the walker's position is plain data and
//! a traversal can stop between any two fibers and resume later.

mod lane;
mod tree;

pub use lane::Lane;
pub use tree::{Children, FiberTree};

use std::rc::Rc;

use crate::element::{Component, Element, ElementType, Key, NodeRef, Props};
use crate::hooks::Hooks;

slotmap::new_key_type! {
    /// Stable, generational handle to a fiber in a [`FiberTree`].
    pub struct FiberId;
}

/// Opaque handle into the renderer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// The two kinds of fiber, which capture and bubble differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiberKind {
    /// Backed by a renderer node.
    Host(Rc<str>),
    /// Renders children by calling a function.
    Component(Component),
}

impl From<ElementType> for FiberKind {
    fn from(ty: ElementType) -> Self {
        match ty {
            ElementType::Host(tag) => FiberKind::Host(tag),
            ElementType::Component(component) => FiberKind::Component(component),
        }
    }
}

/// One reconciliation unit.
#[derive(Debug)]
pub struct Fiber {
    pub kind: FiberKind,
    pub key: Option<Key>,
    pub props: Props,
    /// Props before the latest reuse.
    pub last_props: Option<Props>,
    /// Descriptor children as last handed to this fiber.
    pub children: Rc<[Element]>,
    /// Child fibers from the previous diff, in document order.
    pub kids: Vec<FiberId>,

    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    /// Structural successor spliced in from an enclosing component.
    pub successor: Option<FiberId>,
    /// Nearest host ancestor.
    pub host_parent: Option<FiberId>,

    pub node: Option<NodeHandle>,
    /// Handed the node by the commit; survives reuse.
    pub node_ref: Option<NodeRef>,
    pub hooks: Option<Hooks>,
    pub lane: Lane,

    pub(crate) next_effect: Option<FiberId>,
    pub(crate) next_detach: Option<FiberId>,
}

impl Fiber {
    /// Fresh fiber for a descriptor that matched nothing.
    pub fn from_element(element: Element) -> Self {
        Self {
            kind: element.ty.into(),
            key: element.key,
            props: element.props,
            last_props: None,
            children: element.children,
            kids: Vec::new(),
            parent: None,
            child: None,
            sibling: None,
            successor: None,
            host_parent: None,
            node: None,
            node_ref: element.node_ref,
            hooks: None,
            lane: Lane::NONE,
            next_effect: None,
            next_detach: None,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, FiberKind::Component(_))
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            FiberKind::Host(tag) => Some(tag),
            FiberKind::Component(_) => None,
        }
    }

    /// (key, type) identity against a descriptor.
    pub fn same(&self, element: &Element) -> bool {
        if self.key != element.key {
            return false;
        }
        match (&self.kind, &element.ty) {
            (FiberKind::Host(a), ElementType::Host(b)) => a == b,
            (FiberKind::Component(a), ElementType::Component(b)) => a == b,
            _ => false,
        }
    }

    /// Take over a matching descriptor, keeping node, kids, hooks and the
    /// node ref. A ref on the new descriptor replaces the kept one.
    pub(crate) fn reuse(&mut self, element: Element, op: Lane) {
        let previous = std::mem::replace(&mut self.props, element.props);
        self.last_props = Some(previous);
        self.children = element.children;
        if element.node_ref.is_some() {
            self.node_ref = element.node_ref;
        }
        self.lane = self.lane.with_op(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_compares_key_and_type() {
        let fiber = Fiber::from_element(Element::host("div").key(1));

        assert!(fiber.same(&Element::host("div").key(1)));
        assert!(fiber.same(&Element::host("div").key(1).prop("changed", true)));
        assert!(!fiber.same(&Element::host("div").key(2)));
        assert!(!fiber.same(&Element::host("span").key(1)));
        assert!(!fiber.same(&Element::host("div")));
    }

    #[test]
    fn test_same_for_components() {
        let row = Component::new("Row", |_, _, _| Vec::new());
        let other = Component::new("Row", |_, _, _| Vec::new());
        let fiber = Fiber::from_element(Element::component(&row));

        assert!(fiber.same(&Element::component(&row)));
        assert!(!fiber.same(&Element::component(&other)));
        assert!(!fiber.same(&Element::host("Row")));
    }

    #[test]
    fn test_reuse_keeps_dirty_and_swaps_props() {
        let mut fiber = Fiber::from_element(Element::host("p").prop("v", 1));
        fiber.lane = Lane::INSERT | Lane::DIRTY;
        fiber.node = Some(NodeHandle(7));

        fiber.reuse(Element::host("p").prop("v", 2), Lane::UPDATE);

        assert_eq!(fiber.lane, Lane::UPDATE | Lane::DIRTY);
        assert_eq!(fiber.node, Some(NodeHandle(7)));
        assert_eq!(fiber.props.get_int("v"), Some(2));
        assert_eq!(fiber.last_props.as_ref().and_then(|p| p.get_int("v")), Some(1));
    }

    #[test]
    fn test_reuse_carries_node_ref() {
        let first = NodeRef::new(|_| {});
        let mut fiber = Fiber::from_element(Element::host("input").node_ref(first.clone()));

        fiber.reuse(Element::host("input"), Lane::INSERT);
        assert_eq!(fiber.node_ref, Some(first));

        let second = NodeRef::new(|_| {});
        fiber.reuse(Element::host("input").node_ref(second.clone()), Lane::UPDATE);
        assert_eq!(fiber.node_ref, Some(second));
    }
}
