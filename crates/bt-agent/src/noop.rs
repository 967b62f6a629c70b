//! A no-op behavior task for agents that occupy a slot without acting.

use crate::{Agent, BehaviorTask, TaskContext, TaskStatus};

/// A [`BehaviorTask`] that always succeeds and never touches the context.
///
/// Useful as a placeholder in tests or for passive agents that exist only to
/// be looked up by name.
pub struct NoopTask;

impl BehaviorTask for NoopTask {
    fn exec(&mut self, _agent: &Agent, _ctx: &mut dyn TaskContext) -> TaskStatus {
        TaskStatus::Success
    }
}
