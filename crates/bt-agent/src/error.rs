use thiserror::Error;

/// Binding, registration and state-blob errors.
///
/// All variants are recoverable: the operation that produced them left the
/// context unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("instance name '{name}' is not registered for class '{class}' or its ancestors")]
    UnregisteredName { name: String, class: String },

    #[error("instance name '{0}' is already bound to a different agent")]
    NameAlreadyBound(String),

    #[error("instance name '{0}' is not bound")]
    NameNotBound(String),

    #[error("agent '{0}' is not registered in this context")]
    NotRegistered(String),

    #[error("unknown agent class '{0}'")]
    UnknownClass(String),

    #[error("type registration error: {0}")]
    Registration(String),

    #[error("static variable '{class}.{name}' must be finite")]
    NonFiniteValue { class: String, name: String },

    #[error("agent state error: {0}")]
    State(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
