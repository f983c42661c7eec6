//! Shared fixtures: a counting renderer, a recording commit, and a scheduler
//! that yields after a fixed number of fiber visits.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use spark_fiber::{
    Commit, FiberId, FiberKind, FiberTree, FinishedWork, HostInstance, Lane, NodeHandle, Renderer,
    Scheduler, Transition, WorkUnit,
};

// =============================================================================
// Renderer
// =============================================================================

/// Hands out sequential handles and remembers what it created.
#[derive(Default)]
pub struct CountingRenderer {
    next: u64,
    pub created: Vec<(String, bool)>,
}

impl Renderer for CountingRenderer {
    fn create_handle(&mut self, host: &HostInstance<'_>) -> NodeHandle {
        self.next += 1;
        self.created.push((host.tag.to_string(), host.svg));
        NodeHandle(self.next)
    }
}

// =============================================================================
// Commit
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub label: String,
    pub op: Lane,
    pub node: Option<NodeHandle>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitRecord {
    pub effects: Vec<Effect>,
    pub detached: Vec<String>,
}

impl CommitRecord {
    pub fn count(&self, op: Lane) -> usize {
        self.effects.iter().filter(|e| e.op == op).count()
    }
}

/// Records every commit and delivers node refs; optionally appends "commit"
/// to a shared log.
#[derive(Default)]
pub struct RecordingCommit {
    pub records: Vec<CommitRecord>,
    pub log: Option<Rc<RefCell<Vec<String>>>>,
}

impl RecordingCommit {
    pub fn with_log(log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            records: Vec::new(),
            log: Some(log),
        }
    }

    pub fn last(&self) -> &CommitRecord {
        self.records.last().expect("at least one commit")
    }
}

impl Commit for RecordingCommit {
    fn commit(&mut self, tree: &FiberTree, work: &FinishedWork) {
        let effects = work
            .effects(tree)
            .map(|id| Effect {
                label: label(tree, id),
                op: tree[id].lane.op(),
                node: tree[id].node,
            })
            .collect();
        let detached = work.detached(tree).map(|id| label(tree, id)).collect();
        self.records.push(CommitRecord { effects, detached });

        for id in work.effects(tree) {
            let fiber = &tree[id];
            if let Some(node_ref) = &fiber.node_ref {
                if fiber.lane.op() == Lane::INSERT {
                    node_ref.set(fiber.node);
                }
            }
        }
        for id in work.detached(tree).flat_map(|id| tree.subtree(id)) {
            if let Some(node_ref) = &tree[id].node_ref {
                node_ref.set(None);
            }
        }
        if let Some(log) = &self.log {
            log.borrow_mut().push("commit".to_string());
        }
    }
}

/// `tag#key:text`, or `<Component>#key` for components.
pub fn label(tree: &FiberTree, id: FiberId) -> String {
    let fiber = &tree[id];
    let mut out = match &fiber.kind {
        FiberKind::Host(tag) => tag.to_string(),
        FiberKind::Component(component) => format!("<{}>", component.name()),
    };
    if let Some(key) = &fiber.key {
        out.push_str(&format!("#{key}"));
    }
    if let Some(text) = fiber.props.get_str("text") {
        out.push_str(&format!(":{text}"));
    }
    out
}

/// Nested `label[node](children...)` rendering of the live tree.
pub fn snapshot(tree: &FiberTree, id: FiberId) -> String {
    let fiber = &tree[id];
    let mut out = label(tree, id);
    if let Some(node) = fiber.node {
        out.push_str(&format!("[{}]", node.0));
    }
    let kids: Vec<String> = tree.children(id).map(|kid| snapshot(tree, kid)).collect();
    if !kids.is_empty() {
        out.push('(');
        out.push_str(&kids.join(" "));
        out.push(')');
    }
    out
}

// =============================================================================
// Scheduler
// =============================================================================

/// Allows `budget` fiber visits per slice, then yields.
pub struct StepScheduler {
    units: VecDeque<WorkUnit>,
    transitions: VecDeque<Transition>,
    budget: usize,
    used: usize,
    pub yields: usize,
}

impl StepScheduler {
    pub fn new(budget: usize) -> Self {
        Self {
            units: VecDeque::new(),
            transitions: VecDeque::new(),
            budget,
            used: 0,
            yields: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn pending_units(&self) -> usize {
        self.units.len()
    }
}

impl Scheduler for StepScheduler {
    fn schedule(&mut self, unit: WorkUnit) {
        if unit.is_started() {
            self.units.push_front(unit);
        } else {
            self.units.push_back(unit);
        }
    }

    fn should_yield(&mut self) -> bool {
        if self.used >= self.budget {
            self.yields += 1;
            return true;
        }
        self.used += 1;
        false
    }

    fn start_transition(&mut self, callback: Transition) {
        self.transitions.push_back(callback);
    }

    fn next_unit(&mut self) -> Option<WorkUnit> {
        self.units.pop_front()
    }

    fn next_transition(&mut self) -> Option<Transition> {
        self.transitions.pop_front()
    }

    fn begin_slice(&mut self) {
        self.used = 0;
    }
}

/// Install a fmt subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
