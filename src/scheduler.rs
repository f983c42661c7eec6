//! Frame scheduler - a reference [`Scheduler`] with a per-slice time budget.
//!
//! # Pattern
//!
//! - Work units queue FIFO; a continuation (a unit that already started)
//!   jumps to the front so an interrupted pass finishes before the next one
//!   touches the tree
//! - Transitions queue FIFO and only run once no unit is pending
//! - `should_yield` fires once the current slice has used its budget, but
//!   never on the first poll of a slice, so every slice visits at least one
//!   fiber and a work loop always makes progress
//!
//! ```ignore
//! let mut root = create_root(container, renderer, FrameScheduler::default(), commit);
//! root.render(app);
//! // once per frame:
//! root.work_loop();
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::ReconcilerConfig;
use crate::host::{Scheduler, Transition};
use crate::reconciler::WorkUnit;

pub struct FrameScheduler {
    units: VecDeque<WorkUnit>,
    transitions: VecDeque<Transition>,
    budget: Duration,
    deadline: Option<Instant>,
    fresh: bool,
}

impl FrameScheduler {
    pub fn new(budget: Duration) -> Self {
        Self {
            units: VecDeque::new(),
            transitions: VecDeque::new(),
            budget,
            deadline: None,
            fresh: false,
        }
    }

    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self::new(config.frame_budget)
    }

    /// Units waiting to run.
    pub fn pending_units(&self) -> usize {
        self.units.len()
    }

    /// Transitions waiting to run.
    pub fn pending_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_idle(&self) -> bool {
        self.units.is_empty() && self.transitions.is_empty()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::from_config(&ReconcilerConfig::default())
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&mut self, unit: WorkUnit) {
        if unit.is_started() {
            self.units.push_front(unit);
        } else {
            self.units.push_back(unit);
        }
    }

    fn should_yield(&mut self) -> bool {
        if std::mem::take(&mut self.fresh) {
            return false;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
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
        self.deadline = Some(Instant::now() + self.budget);
        self.fresh = true;
    }
}
