//! Framework error type.
//!
//! Sub-crates define their own error enums (`AgentError`, `ContextError`,
//! `WorkspaceError`, …) and wrap lower-level ones via `#[from]`.  `BtError`
//! covers the handful of failures that live below any of them.

use thiserror::Error;

use crate::{AgentId, ContextId};

/// The top-level error type for `bt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum BtError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("context {0} not found")]
    ContextNotFound(ContextId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `bt-*` crates.
pub type BtResult<T> = Result<T, BtError>;
