//! The logging sink that receives static-variable diffs and agent state lines.
//!
//! The sink is an external collaborator: the context decides *what* changed,
//! the sink decides *where* it goes.  [`TracingSink`] forwards everything to
//! `tracing`; bt-output provides file and database backends.

use bt_agent::Agent;
use bt_core::{ContextId, VarChange};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log sink rejected record: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LogResult<T> = Result<T, LogError>;

/// Destination for diagnostic records emitted by a context.
///
/// A failed write must return `Err`: the static tracker only advances a
/// class's baseline after its changes were accepted, so nothing is lost.
pub trait LogSink {
    /// Changed static variables of `class`, in ascending name order.
    fn log_static_changes(
        &mut self,
        context: ContextId,
        frame:   u64,
        class:   &str,
        changes: &[VarChange],
    ) -> LogResult<()>;

    /// One agent's current-state diagnostic line.
    fn log_agent_state(
        &mut self,
        context: ContextId,
        frame:   u64,
        agent:   &Agent,
        state:   &str,
    ) -> LogResult<()>;
}

/// A [`LogSink`] that emits structured `tracing` events at `INFO`.
///
/// Targets are `bt::statics` and `bt::state`, so they can be filtered
/// independently with `RUST_LOG`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log_static_changes(
        &mut self,
        context: ContextId,
        frame:   u64,
        class:   &str,
        changes: &[VarChange],
    ) -> LogResult<()> {
        for change in changes {
            info!(target: "bt::statics", %context, frame, class, %change, "static variable changed");
        }
        Ok(())
    }

    fn log_agent_state(
        &mut self,
        context: ContextId,
        frame:   u64,
        agent:   &Agent,
        state:   &str,
    ) -> LogResult<()> {
        info!(
            target: "bt::state",
            %context,
            frame,
            agent = %agent.id(),
            class = agent.class_name(),
            name = agent.name(),
            state,
            "agent state"
        );
        Ok(())
    }
}
