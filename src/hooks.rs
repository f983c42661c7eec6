//! Hook storage - per-fiber stateful entries that survive reuse.
//!
//! A component declares hooks in a fixed order on every render; the cursor
//! is rewound before each invocation so the n-th declaration always lands on
//! the n-th entry.
//!
//! # Effects
//!
//! Declaring an effect whose deps changed does not run it. The entry is
//! queued, and the reconciler drains the queue when the owning fiber bubbles:
//! - layout effects run synchronously at bubble time
//! - passive effects are handed to the scheduler as one transition
//!
//! Running a queue first invokes the previous cleanup of every queued entry,
//! then each body, storing the cleanup it returns. A batch whose fiber was
//! unmounted before it ran does nothing.
//!
//! ```ignore
//! let counter = Component::new("Counter", |_props, _children, hooks| {
//!     let renders = hooks.use_ref(|| 0u32);
//!     *renders.borrow_mut() += 1;
//!     hooks.use_effect((), || {
//!         println!("mounted");
//!         Some(Box::new(|| println!("unmounted")))
//!     });
//!     vec![Element::text(format!("{}", renders.borrow()))]
//! });
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::fiber::FiberId;

/// Teardown returned by an effect body.
pub type Cleanup = Box<dyn FnOnce()>;

type EffectBody = Box<dyn FnOnce() -> Option<Cleanup>>;
type CleanupCell = Rc<RefCell<Option<Cleanup>>>;

// =============================================================================
// Entries
// =============================================================================

enum Slot {
    Effect {
        deps: Box<dyn Any>,
        cleanup: CleanupCell,
    },
    Ref(Rc<dyn Any>),
}

struct PendingEffect {
    body: EffectBody,
    cleanup: CleanupCell,
}

#[derive(Clone, Copy)]
enum Phase {
    Layout,
    Passive,
}

/// A drained queue of effects, ready to run.
pub struct EffectBatch {
    effects: Vec<PendingEffect>,
    mounted: Rc<Cell<bool>>,
}

impl EffectBatch {
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run prior cleanups, then bodies. No-op once the owner unmounted.
    pub fn run(self) {
        if !self.mounted.get() {
            return;
        }
        for effect in &self.effects {
            let previous = effect.cleanup.borrow_mut().take();
            if let Some(cleanup) = previous {
                cleanup();
            }
        }
        for effect in self.effects {
            let cleanup = (effect.body)();
            *effect.cleanup.borrow_mut() = cleanup;
        }
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Ordered hook entries owned by one fiber.
pub struct Hooks {
    owner: FiberId,
    list: Vec<Slot>,
    cursor: usize,
    layout: Vec<PendingEffect>,
    passive: Vec<PendingEffect>,
    mounted: Rc<Cell<bool>>,
}

impl Hooks {
    pub(crate) fn new(owner: FiberId) -> Self {
        Self {
            owner,
            list: Vec::new(),
            cursor: 0,
            layout: Vec::new(),
            passive: Vec::new(),
            mounted: Rc::new(Cell::new(true)),
        }
    }

    /// The fiber owning these hooks. Pass it to `Reconciler::update` to
    /// re-render the component.
    pub fn fiber(&self) -> FiberId {
        self.owner
    }

    /// Rewind the cursor to the first entry.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Passive effect, re-run whenever `deps` differs from the previous render.
    pub fn use_effect<D, F>(&mut self, deps: D, body: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        self.push_effect(Phase::Passive, deps, Box::new(body));
    }

    /// Layout effect, run synchronously when the fiber bubbles.
    pub fn use_layout_effect<D, F>(&mut self, deps: D, body: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        self.push_effect(Phase::Layout, deps, Box::new(body));
    }

    /// Mutable cell that keeps its value for the fiber's whole life.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        let index = self.next_index();

        if let Some(Slot::Ref(existing)) = self.list.get(index) {
            if let Ok(cell) = existing.clone().downcast::<RefCell<T>>() {
                return cell;
            }
        }

        let cell = Rc::new(RefCell::new(init()));
        self.store(index, Slot::Ref(cell.clone()));
        cell
    }

    fn push_effect<D: PartialEq + 'static>(&mut self, phase: Phase, deps: D, body: EffectBody) {
        let index = self.next_index();

        let cleanup = match self.list.get_mut(index) {
            Some(Slot::Effect {
                deps: previous,
                cleanup,
            }) => {
                let unchanged = (**previous)
                    .downcast_ref::<D>()
                    .is_some_and(|previous| *previous == deps);
                if unchanged {
                    return;
                }
                *previous = Box::new(deps);
                cleanup.clone()
            }
            _ => {
                let cleanup: CleanupCell = Rc::new(RefCell::new(None));
                self.store(
                    index,
                    Slot::Effect {
                        deps: Box::new(deps),
                        cleanup: cleanup.clone(),
                    },
                );
                cleanup
            }
        };

        let pending = PendingEffect { body, cleanup };
        match phase {
            Phase::Layout => self.layout.push(pending),
            Phase::Passive => self.passive.push(pending),
        }
    }

    fn next_index(&mut self) -> usize {
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    fn store(&mut self, index: usize, slot: Slot) {
        if index < self.list.len() {
            self.list[index] = slot;
        } else {
            self.list.push(slot);
        }
    }

    pub(crate) fn take_layout(&mut self) -> EffectBatch {
        EffectBatch {
            effects: std::mem::take(&mut self.layout),
            mounted: self.mounted.clone(),
        }
    }

    pub(crate) fn take_passive(&mut self) -> EffectBatch {
        EffectBatch {
            effects: std::mem::take(&mut self.passive),
            mounted: self.mounted.clone(),
        }
    }

    /// Unmount: run every stored cleanup in list order, drop queued effects
    /// and disarm batches already handed out.
    pub(crate) fn run_cleanups(&mut self) {
        self.mounted.set(false);
        self.layout.clear();
        self.passive.clear();
        for slot in &self.list {
            if let Slot::Effect { cleanup, .. } = slot {
                let cleanup = cleanup.borrow_mut().take();
                if let Some(cleanup) = cleanup {
                    cleanup();
                }
            }
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("owner", &self.owner)
            .field("len", &self.list.len())
            .field("layout", &self.layout.len())
            .field("passive", &self.passive.len())
            .finish()
    }
}
