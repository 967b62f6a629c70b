use bt_context::ContextError;
use bt_core::{BtError, ContextId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{0} does not name a single context")]
    InvalidContextId(ContextId),

    #[error("{0} already exists in this workspace")]
    DuplicateContext(ContextId),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("workspace configuration error: {0}")]
    Config(#[from] BtError),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
