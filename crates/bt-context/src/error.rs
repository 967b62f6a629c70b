use bt_agent::AgentError;
use bt_core::ContextId;
use thiserror::Error;

use crate::LogError;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("context {0} is executing; the operation is only valid between ticks")]
    Executing(ContextId),

    #[error("snapshot does not match context: {0}")]
    StructuralMismatch(String),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("state encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type ContextResult<T> = Result<T, ContextError>;
