//! Sequence differ - reconcile one parent's old child fibers against its new
//! descriptors.
//!
//! # Algorithm
//!
//! Four pointers close in on the unmatched middle from both ends:
//!
//! 1. Tail scan: while the last old and last new entries are the same
//!    (key and type), reuse the old fiber as UPDATE.
//! 2. Head scan: while the first entries are the same, move both heads.
//!    Reuse is deferred to step 5.
//! 3. If the old middle is empty, every new middle entry is an INSERT. If
//!    the new middle is empty, every old middle entry is removed.
//! 4. Otherwise look new middle entries up by key, scanning from the end.
//!    A keyed hit is reused as INSERT (it moved); a miss is a fresh INSERT.
//!    Old middle entries nobody claimed are removed.
//! 5. Reuse the head-scan matches as UPDATE.
//!
//! Positional matches always win over keyed ones. Most updates touch the
//! ends of a list, so an item aligned at either end is reused in place even
//! if a same-keyed entry exists elsewhere.

use std::collections::HashMap;

use tracing::trace;

use crate::element::{Element, Key};
use crate::fiber::{Fiber, FiberId, FiberTree, Lane};

use super::work::WorkUnit;

/// What one diff did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub updated: usize,
    pub inserted: usize,
    pub moved: usize,
    pub removed: usize,
}

/// Replace `parent`'s children with fibers for `new`, relinking the
/// child/sibling chain in the new order.
pub(crate) fn diff_children(
    tree: &mut FiberTree,
    parent: FiberId,
    new: &[Element],
    unit: &mut WorkUnit,
) -> DiffStats {
    let old = std::mem::take(&mut tree[parent].kids);
    let mut slots: Vec<Option<FiberId>> = vec![None; new.len()];
    let mut stats = DiffStats::default();

    let (mut a_head, mut a_end) = (0, old.len());
    let (mut b_head, mut b_end) = (0, new.len());

    while a_head < a_end && b_head < b_end && tree[old[a_end - 1]].same(&new[b_end - 1]) {
        a_end -= 1;
        b_end -= 1;
        slots[b_end] = Some(reuse(tree, old[a_end], &new[b_end], Lane::UPDATE));
        stats.updated += 1;
    }

    while a_head < a_end && b_head < b_end && tree[old[a_head]].same(&new[b_head]) {
        a_head += 1;
        b_head += 1;
    }

    if a_head == a_end {
        for i in (b_head..b_end).rev() {
            slots[i] = Some(insert(tree, &new[i]));
            stats.inserted += 1;
        }
    } else if b_head == b_end {
        for j in (a_head..a_end).rev() {
            remove(tree, old[j], unit);
            stats.removed += 1;
        }
    } else {
        let mut keyed: HashMap<Key, usize> = HashMap::new();
        for (j, &id) in old.iter().enumerate().take(a_end).skip(a_head) {
            if let Some(key) = &tree[id].key {
                keyed.insert(key.clone(), j);
            }
        }

        let mut claimed = vec![false; a_end - a_head];
        for i in (b_head..b_end).rev() {
            let element = &new[i];
            let hit = element
                .key
                .as_ref()
                .and_then(|key| keyed.get(key).copied())
                .filter(|&j| tree[old[j]].same(element));

            match hit {
                Some(j) => {
                    if let Some(key) = &element.key {
                        keyed.remove(key);
                    }
                    claimed[j - a_head] = true;
                    slots[i] = Some(reuse(tree, old[j], element, Lane::INSERT));
                    stats.moved += 1;
                }
                None => {
                    slots[i] = Some(insert(tree, element));
                    stats.inserted += 1;
                }
            }
        }

        for j in a_head..a_end {
            if !claimed[j - a_head] {
                remove(tree, old[j], unit);
                stats.removed += 1;
            }
        }
    }

    for i in (0..b_head).rev() {
        slots[i] = Some(reuse(tree, old[i], &new[i], Lane::UPDATE));
        stats.updated += 1;
    }

    let kids: Vec<FiberId> = slots.into_iter().flatten().collect();
    link(tree, parent, &kids);
    tree[parent].kids = kids;

    trace!(
        ?parent,
        updated = stats.updated,
        inserted = stats.inserted,
        moved = stats.moved,
        removed = stats.removed,
        "diffed children"
    );
    stats
}

fn reuse(tree: &mut FiberTree, id: FiberId, element: &Element, op: Lane) -> FiberId {
    tree[id].reuse(element.clone(), op);
    id
}

fn insert(tree: &mut FiberTree, element: &Element) -> FiberId {
    let mut fiber = Fiber::from_element(element.clone());
    fiber.lane = Lane::INSERT;
    tree.insert(fiber)
}

fn remove(tree: &mut FiberTree, id: FiberId, unit: &mut WorkUnit) {
    let fiber = &mut tree[id];
    fiber.lane = fiber.lane.with_op(Lane::REMOVE);
    unit.push_detach(tree, id);
}

/// Thread `kids` into the intrusive chain under `parent`.
fn link(tree: &mut FiberTree, parent: FiberId, kids: &[FiberId]) {
    let svg = tree[parent].lane.is_svg();
    tree[parent].child = kids.first().copied();

    for (i, &kid) in kids.iter().enumerate() {
        let fiber = &mut tree[kid];
        fiber.parent = Some(parent);
        fiber.sibling = kids.get(i + 1).copied();
        fiber.successor = None;
    }

    if svg {
        if let Some(&first) = kids.first() {
            tree[first].lane |= Lane::SVG;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::NodeHandle;

    fn li(key: i64) -> Element {
        Element::host("li").key(key)
    }

    /// Parent with children already reconciled once and given node handles.
    fn mounted(tree: &mut FiberTree, items: &[Element]) -> (FiberId, WorkUnit) {
        let parent = tree.insert(Fiber::from_element(Element::host("ul")));
        let mut unit = WorkUnit::new(parent);
        diff_children(tree, parent, items, &mut unit);
        for (n, &kid) in tree[parent].kids.clone().iter().enumerate() {
            tree[kid].node = Some(NodeHandle(n as u64 + 1));
            tree[kid].lane = Lane::NONE;
        }
        (parent, WorkUnit::new(parent))
    }

    fn keys(tree: &FiberTree, parent: FiberId) -> Vec<Option<Key>> {
        tree.children(parent).map(|id| tree[id].key.clone()).collect()
    }

    fn ops(tree: &FiberTree, parent: FiberId) -> Vec<Lane> {
        tree.children(parent).map(|id| tree[id].lane.op()).collect()
    }

    #[test]
    fn test_identity_stable_when_nothing_moves() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), li(2), li(3)]);
        let before = tree[parent].kids.clone();

        let stats = diff_children(
            &mut tree,
            parent,
            &[li(1).prop("x", 1), li(2), li(3)],
            &mut unit,
        );

        assert_eq!(tree[parent].kids, before);
        assert_eq!(ops(&tree, parent), vec![Lane::UPDATE; 3]);
        assert_eq!(stats, DiffStats { updated: 3, ..Default::default() });
        assert_eq!(unit.finish().detach_count(), 0);
    }

    #[test]
    fn test_append_inserts_only_the_new_tail() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), li(2), li(3)]);
        let before = tree[parent].kids.clone();

        diff_children(&mut tree, parent, &[li(1), li(2), li(3), li(4)], &mut unit);

        let kids = tree[parent].kids.clone();
        assert_eq!(&kids[..3], &before[..]);
        assert_eq!(
            ops(&tree, parent),
            vec![Lane::UPDATE, Lane::UPDATE, Lane::UPDATE, Lane::INSERT]
        );
        assert_eq!(tree[kids[3]].node, None);
    }

    #[test]
    fn test_pure_reorder_reuses_every_fiber() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), li(2), li(3)]);

        let stats = diff_children(&mut tree, parent, &[li(3), li(1), li(2)], &mut unit);

        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(
            keys(&tree, parent),
            vec![Some(Key::Int(3)), Some(Key::Int(1)), Some(Key::Int(2))]
        );
        let nodes: Vec<_> = tree.children(parent).map(|id| tree[id].node).collect();
        assert_eq!(
            nodes,
            vec![Some(NodeHandle(3)), Some(NodeHandle(1)), Some(NodeHandle(2))]
        );
    }

    #[test]
    fn test_empty_to_full_inserts_everything() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[]);

        diff_children(
            &mut tree,
            parent,
            &[Element::host("li").key("a"), Element::host("li").key("b")],
            &mut unit,
        );

        assert_eq!(ops(&tree, parent), vec![Lane::INSERT, Lane::INSERT]);
        assert_eq!(unit.finish().detach_count(), 0);
    }

    #[test]
    fn test_full_to_empty_detaches_in_reverse() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(
            &mut tree,
            &[Element::host("li").key("a"), Element::host("li").key("b")],
        );
        let old = tree[parent].kids.clone();

        diff_children(&mut tree, parent, &[], &mut unit);

        assert_eq!(tree[parent].child, None);
        assert!(tree[parent].kids.is_empty());
        let done = unit.finish();
        assert_eq!(done.detached(&tree).collect::<Vec<_>>(), vec![old[1], old[0]]);
        assert!(old.iter().all(|&id| tree[id].lane.op() == Lane::REMOVE));
    }

    #[test]
    fn test_type_change_in_place_replaces() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[Element::host("div"), Element::host("span")]);
        let old = tree[parent].kids.clone();

        diff_children(
            &mut tree,
            parent,
            &[Element::host("p"), Element::host("span")],
            &mut unit,
        );

        let kids = tree[parent].kids.clone();
        assert_ne!(kids[0], old[0]);
        assert_eq!(kids[1], old[1]);
        assert_eq!(tree[kids[0]].lane.op(), Lane::INSERT);
        assert_eq!(tree[kids[0]].node, None);
        assert_eq!(
            unit.finish().detached(&tree).collect::<Vec<_>>(),
            vec![old[0]]
        );
    }

    #[test]
    fn test_mixed_keyed_unkeyed() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), Element::host("li")]);
        let old = tree[parent].kids.clone();

        let new = [Element::host("li"), li(1)];
        let stats = diff_children(&mut tree, parent, &new, &mut unit);

        let kids = tree[parent].kids.clone();
        assert_eq!(kids[1], old[0]);
        assert_ne!(kids[0], old[1]);
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.removed, 1);

        // Reconciling the same list again settles.
        let mut again = WorkUnit::new(parent);
        let stats = diff_children(&mut tree, parent, &new, &mut again);
        assert_eq!(stats, DiffStats { updated: 2, ..Default::default() });
        assert_eq!(again.finish().detach_count(), 0);
    }

    #[test]
    fn test_positional_match_beats_keyed_match() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), li(2), li(3), li(4)]);
        let old = tree[parent].kids.clone();

        // 1 and 4 align at the ends; 2 and 3 swap in the middle.
        diff_children(&mut tree, parent, &[li(1), li(3), li(2), li(4)], &mut unit);

        let kids = tree[parent].kids.clone();
        assert_eq!(kids, vec![old[0], old[2], old[1], old[3]]);
        assert_eq!(
            ops(&tree, parent),
            vec![Lane::UPDATE, Lane::INSERT, Lane::INSERT, Lane::UPDATE]
        );
    }

    #[test]
    fn test_same_key_different_type_is_not_reused() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), li(2)]);
        let old = tree[parent].kids.clone();

        diff_children(
            &mut tree,
            parent,
            &[Element::host("p").key(2), Element::host("p").key(1)],
            &mut unit,
        );

        let kids = tree[parent].kids.clone();
        assert!(kids.iter().all(|id| !old.contains(id)));
        assert_eq!(unit.finish().detach_count(), 2);
    }

    #[test]
    fn test_links_follow_new_order() {
        let mut tree = FiberTree::new();
        let (parent, mut unit) = mounted(&mut tree, &[li(1), li(2)]);

        diff_children(&mut tree, parent, &[li(2), li(3), li(1)], &mut unit);

        let kids = tree[parent].kids.clone();
        assert_eq!(tree[parent].child, Some(kids[0]));
        assert_eq!(tree[kids[0]].sibling, Some(kids[1]));
        assert_eq!(tree[kids[1]].sibling, Some(kids[2]));
        assert_eq!(tree[kids[2]].sibling, None);
        assert!(kids.iter().all(|&id| tree[id].parent == Some(parent)));
    }

    #[test]
    fn test_svg_context_reaches_first_child() {
        let mut tree = FiberTree::new();
        let parent = tree.insert(Fiber::from_element(Element::host("svg")));
        tree[parent].lane = Lane::SVG;
        let mut unit = WorkUnit::new(parent);

        diff_children(
            &mut tree,
            parent,
            &[Element::host("circle"), Element::host("rect")],
            &mut unit,
        );

        let kids = tree[parent].kids.clone();
        assert!(tree[kids[0]].lane.is_svg());
    }
}
