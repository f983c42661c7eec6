//! # spark-fiber
//!
//! Incremental fiber reconciler for virtual-tree UI runtimes.
//!
//! Given the fibers rendered last time and a freshly computed tree of
//! [`Element`] descriptors, the reconciler works out the structural edits
//! (insert / update / remove) and hands them to a commit collaborator. The
//! walk is interruptible between any two fibers, so a host scheduler can
//! spread one reconciliation over several frames.
//!
//! ## Architecture
//!
//! Fibers live in an arena ([`FiberTree`]) and link to each other by id, so
//! the walker's position is a single id and suspension is plain data:
//!
//! ```text
//! update(fiber) → WorkUnit → capture/bubble steps → FinishedWork → Commit
//!                    ▲                │
//!                    └── yield ───────┘
//! ```
//!
//! The reconciler itself never touches concrete UI nodes. The host supplies:
//! - a [`Renderer`] that creates node handles
//! - a [`Scheduler`] that decides when to yield ([`FrameScheduler`] is a
//!   ready-made one)
//! - a [`Commit`] that applies the effect and detach chains
//!
//! ## Modules
//!
//! - [`element`] - Descriptors, keys, props, components
//! - [`fiber`] - Fiber arena and lane flags
//! - [`hooks`] - Per-fiber hook storage and effect batches
//! - [`reconciler`] - Sequence differ, walker, work units, root surface
//! - [`host`] - Collaborator traits
//! - [`scheduler`] - Time-sliced reference scheduler
//!
//! ## Tracing
//!
//! Scheduling, yields and commits are reported at `debug` level, individual
//! fiber visits and diffs at `trace` level, through [`tracing`]. No
//! subscriber is installed by this crate.

pub mod config;
pub mod element;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod reconciler;
pub mod scheduler;

pub use config::ReconcilerConfig;
pub use element::{Component, Element, ElementType, Key, NodeRef, PropValue, Props};
pub use error::{ReconcileError, Result};
pub use fiber::{Fiber, FiberId, FiberKind, FiberTree, Lane, NodeHandle};
pub use hooks::{Cleanup, Hooks};
pub use host::{Commit, HostInstance, Renderer, Scheduler, Transition};
pub use reconciler::{
    create_root, render, DiffStats, FinishedWork, Reconciler, WorkStatus, WorkUnit,
};
pub use scheduler::FrameScheduler;
