//! Incremental walker - one depth-first step at a time, no call stack.
//!
//! # Capture / Bubble
//!
//! ```text
//! capture(f)   component: call it with its props and descriptor children,
//!                         diff its output against f.kids
//!              host:      create the node if missing, diff f.children
//!              f has a child?  -> next step is that child
//! bubble(f)    component: splice its sibling onto its last host, mark its
//!                         top-level hosts INSERT if it moved, run hooks
//!              host:      append to the effect chain
//!              f is the boundary?  -> done
//!              f has a sibling?    -> next step is that sibling
//!              otherwise bubble f.parent
//! ```
//!
//! Every step ends with the next fiber to capture (or `None`), so the
//! position between steps is one id stored in the work unit.

use tracing::trace;

use crate::element::{Component, SVG_TAG};
use crate::fiber::{FiberId, FiberKind, FiberTree, Lane};
use crate::hooks::Hooks;
use crate::host::{HostInstance, Renderer, Scheduler};

use super::diff::diff_children;
use super::effects::invoke_hooks;
use super::work::WorkUnit;

/// Borrowed view of everything one step needs.
pub(crate) struct Walker<'a, R, S> {
    pub tree: &'a mut FiberTree,
    pub renderer: &'a mut R,
    pub scheduler: &'a mut S,
    pub unit: &'a mut WorkUnit,
}

impl<R: Renderer, S: Scheduler> Walker<'_, R, S> {
    /// Process `wip` and return the next fiber to visit, or `None` once the
    /// unit's boundary has been finalized.
    pub fn step(&mut self, wip: FiberId) -> Option<FiberId> {
        self.unit.visited += 1;
        self.capture(wip);

        if let Some(child) = self.tree[wip].child {
            return Some(child);
        }

        let mut current = Some(wip);
        while let Some(id) = current {
            self.bubble(id);

            if id == self.unit.boundary() {
                self.tree[id].lane.remove(Lane::DIRTY);
                return None;
            }
            if let Some(sibling) = self.tree[id].sibling {
                return Some(sibling);
            }
            current = self.tree[id].parent;
        }
        None
    }

    fn capture(&mut self, wip: FiberId) {
        trace!(?wip, "capture");
        match self.tree[wip].kind.clone() {
            FiberKind::Component(component) => self.update_component(wip, &component),
            FiberKind::Host(tag) => self.update_host(wip, &tag),
        }
    }

    fn update_component(&mut self, wip: FiberId, component: &Component) {
        let fiber = &mut self.tree[wip];
        let mut hooks = fiber.hooks.take().unwrap_or_else(|| Hooks::new(wip));
        let props = fiber.props.clone();
        let passed = fiber.children.clone();

        hooks.reset_cursor();
        let rendered = component.call(&props, &passed, &mut hooks);
        self.tree[wip].hooks = Some(hooks);

        diff_children(self.tree, wip, &rendered, self.unit);
    }

    fn update_host(&mut self, wip: FiberId, tag: &str) {
        let host_parent = self.tree.nearest_host_ancestor(wip);
        let in_svg = host_parent.is_some_and(|parent| self.tree[parent].lane.is_svg());

        let fiber = &mut self.tree[wip];
        fiber.host_parent = host_parent;
        if tag == SVG_TAG || in_svg {
            fiber.lane |= Lane::SVG;
        }

        if fiber.node.is_none() {
            let instance = HostInstance {
                fiber: wip,
                tag,
                props: &fiber.props,
                svg: fiber.lane.is_svg(),
            };
            let handle = self.renderer.create_handle(&instance);
            fiber.node = Some(handle);
        }

        let children = fiber.children.clone();
        diff_children(self.tree, wip, &children, self.unit);
    }

    fn bubble(&mut self, id: FiberId) {
        if !self.tree[id].is_component() {
            self.unit.push_effect(self.tree, id);
            return;
        }

        let lane = self.tree[id].lane;
        let sibling = self.tree[id].sibling;

        if let Some(sibling) = sibling {
            if let Some(last) = self.tree.last_host(id) {
                self.tree[last].successor = Some(sibling);
            }
        }

        // A moved component moves every node it rendered.
        if lane.contains(Lane::INSERT) {
            for host in self.tree.top_hosts(id) {
                let fiber = &mut self.tree[host];
                fiber.lane = fiber.lane.with_op(Lane::INSERT);
            }
        }

        if let Some(hooks) = self.tree[id].hooks.as_mut() {
            invoke_hooks(hooks, lane, self.scheduler);
        }
    }
}
