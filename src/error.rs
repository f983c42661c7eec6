//! Errors surfaced by the reconciler's outer API.
//!
//! The diff and walk themselves never fail: a malformed tree produces a
//! wrong edit list, not an error. Only requests coming from outside the
//! pass can be rejected.

use thiserror::Error;

use crate::fiber::FiberId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The fiber was removed and retired before the request arrived.
    #[error("fiber {0:?} is no longer part of the tree")]
    StaleFiber(FiberId),

    /// `update` was called before anything was rendered.
    #[error("nothing has been rendered into this root yet")]
    NotMounted,

    #[error("invalid reconciler config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
