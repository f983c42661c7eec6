//! Reconciler settings.

use std::time::Duration;

use crate::error::{ReconcileError, Result};

/// Default slice of frame time one work loop may spend before yielding.
pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(5);

/// Default number of fiber slots reserved up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Tunables for a root and its reference scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Time a work loop may run before `FrameScheduler::should_yield` fires.
    pub frame_budget: Duration,
    /// Fiber arena pre-allocation.
    pub initial_capacity: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            frame_budget: DEFAULT_FRAME_BUDGET,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl ReconcilerConfig {
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Reject settings that would stall the work loop.
    pub fn validate(&self) -> Result<()> {
        if self.frame_budget.is_zero() {
            return Err(ReconcileError::InvalidConfig(
                "frame_budget must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
