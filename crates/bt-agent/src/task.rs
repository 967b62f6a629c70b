//! The `BehaviorTask` trait, the per-agent extension point for user code,
//! and the `TaskContext` seam through which a task talks to its context.

use bt_core::{ContextClock, ContextId, Value};

use crate::{Agent, AgentResult};

/// Opaque per-agent execution state carried through save/load.
pub type StateBlob = serde_json::Value;

/// Result of one behavior-tree execution step.
///
/// The scheduler does not interpret this beyond counting it in the tick
/// report; propagation semantics belong to the tree itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Success,
    Failure,
    Running,
}

/// The view of a context available to a task while it executes.
///
/// Implemented by `bt_context::Context`.  During a tick every structural
/// request (`add_agent`, `remove_agent`) is queued and applied after the
/// walk; the calling task observes the change from the next tick on.
pub trait TaskContext {
    fn context_id(&self) -> ContextId;

    fn clock(&self) -> ContextClock;

    /// `true` while a tick is walking the priority buckets.
    fn is_executing(&self) -> bool;

    fn add_agent(&mut self, agent: &Agent);

    fn remove_agent(&mut self, agent: &Agent);

    fn bind_instance(&mut self, name: &str, agent: &Agent) -> AgentResult<()>;

    fn unbind_instance(&mut self, name: &str) -> AgentResult<()>;

    /// The agent bound to `name`, if any.  Never creates.
    fn instance(&self, name: &str) -> Option<crate::AgentHandle>;

    fn static_var(&self, class: &str, name: &str) -> Option<&Value>;

    fn set_static_var(&mut self, class: &str, name: &str, value: Value) -> AgentResult<()>;
}

/// Pluggable behavior-tree execution for one agent.
///
/// Only [`exec`][Self::exec] is required.  Tasks that carry state worth
/// persisting override [`save_state`][Self::save_state] and
/// [`load_state`][Self::load_state]; the context treats the blob as opaque.
///
/// # Example
///
/// ```rust,ignore
/// struct Patrol { steps: u32 }
///
/// impl BehaviorTask for Patrol {
///     fn exec(&mut self, _agent: &Agent, _ctx: &mut dyn TaskContext) -> TaskStatus {
///         self.steps += 1;
///         TaskStatus::Running
///     }
///
///     fn save_state(&self) -> StateBlob {
///         serde_json::json!({ "steps": self.steps })
///     }
/// }
/// ```
pub trait BehaviorTask: 'static {
    /// Run the tree once for `agent`.  Called exactly once per tick while the
    /// agent is registered.
    fn exec(&mut self, agent: &Agent, ctx: &mut dyn TaskContext) -> TaskStatus;

    /// Snapshot of the task's logical execution state.
    ///
    /// Default: `null` (stateless task).
    fn save_state(&self) -> StateBlob {
        StateBlob::Null
    }

    /// Restore a snapshot produced by [`save_state`][Self::save_state].
    ///
    /// Default: accepts anything and restores nothing.
    fn load_state(&mut self, _state: &StateBlob) -> AgentResult<()> {
        Ok(())
    }

    /// One-line diagnostic of the current state, used by state logging.
    fn describe_state(&self) -> String {
        String::new()
    }
}
