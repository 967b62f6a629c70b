//! Externally owned agents.
//!
//! # Why `Rc` + `Weak`?
//!
//! A context must never control an agent's lifetime, yet it has to reach the
//! agent every tick.  Application code therefore holds the strong
//! [`AgentHandle`] and contexts keep a `Weak<Agent>` obtained through
//! [`Agent::downgrade`].  A context that finds a dead `Weak` skips it and
//! prunes it after the tick.
//!
//! Identity fields (`class`, `name`, `priority`) are immutable, and the
//! registration fields (`id`, `context`) are `Cell`s, so a context can read
//! and update them while the agent's task is mutably borrowed by the walk.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bt_core::{AgentId, ContextId};

use crate::{AgentError, AgentResult, BehaviorTask, StateBlob, TaskContext, TaskStatus};

/// Strong, application-owned reference to an [`Agent`].
pub type AgentHandle = Rc<Agent>;

/// An AI-controlled entity: a class identity, an execution priority, and a
/// behavior-tree task.
pub struct Agent {
    me:       Weak<Agent>,
    class:    String,
    name:     String,
    priority: i32,
    id:       Cell<AgentId>,
    context:  Cell<ContextId>,
    task:     RefCell<Box<dyn BehaviorTask>>,
}

impl Agent {
    /// Create an agent of `class` whose display name is the class name.
    pub fn new(class: impl Into<String>, priority: i32, task: impl BehaviorTask) -> AgentHandle {
        let class = class.into();
        Self::named(class.clone(), class, priority, task)
    }

    /// Create an agent with an explicit display name.
    ///
    /// The display name is diagnostic only; named-instance lookups go
    /// through the context's bindings, not through this field.
    pub fn named(
        name:     impl Into<String>,
        class:    impl Into<String>,
        priority: i32,
        task:     impl BehaviorTask,
    ) -> AgentHandle {
        let name = name.into();
        let class = class.into();
        Rc::new_cyclic(|me| Agent {
            me:       me.clone(),
            class,
            name,
            priority,
            id:       Cell::new(AgentId::INVALID),
            context:  Cell::new(ContextId::INVALID),
            task:     RefCell::new(Box::new(task)),
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution priority; lower values run earlier in a tick.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Context-local id, or `AgentId::INVALID` when unregistered.
    pub fn id(&self) -> AgentId {
        self.id.get()
    }

    /// Context this agent is registered in, or `ContextId::INVALID`.
    pub fn context_id(&self) -> ContextId {
        self.context.get()
    }

    pub fn is_registered(&self) -> bool {
        self.context.get().is_valid()
    }

    /// Non-owning reference suitable for storage in a context.
    pub fn downgrade(&self) -> Weak<Agent> {
        self.me.clone()
    }

    /// Recover a strong handle, if the application still owns the agent.
    pub fn handle(&self) -> Option<AgentHandle> {
        self.me.upgrade()
    }

    /// Identity comparison (same allocation), independent of ids.
    #[inline]
    pub fn same_as(&self, other: &Agent) -> bool {
        std::ptr::eq(self, other)
    }

    /// Record the context registration.  Called by the owning context only.
    #[doc(hidden)]
    pub fn set_registration(&self, context: ContextId, id: AgentId) {
        self.context.set(context);
        self.id.set(id);
    }

    /// Clear the context registration.  Called by the owning context only.
    #[doc(hidden)]
    pub fn clear_registration(&self) {
        self.set_registration(ContextId::INVALID, AgentId::INVALID);
    }

    // ── Task access ───────────────────────────────────────────────────────

    /// Run the behavior-tree task once.
    ///
    /// Returns `None` if the task is already borrowed, which only happens if
    /// a task tries to execute its own agent re-entrantly.
    pub fn exec(&self, ctx: &mut dyn TaskContext) -> Option<TaskStatus> {
        let mut task = self.task.try_borrow_mut().ok()?;
        Some(task.exec(self, ctx))
    }

    /// Snapshot the task's execution state.
    pub fn save_state(&self) -> AgentResult<StateBlob> {
        let task = self
            .task
            .try_borrow()
            .map_err(|_| AgentError::State(format!("task of '{}' is executing", self.name)))?;
        Ok(task.save_state())
    }

    /// Restore the task's execution state.
    pub fn load_state(&self, state: &StateBlob) -> AgentResult<()> {
        let mut task = self
            .task
            .try_borrow_mut()
            .map_err(|_| AgentError::State(format!("task of '{}' is executing", self.name)))?;
        task.load_state(state)
    }

    /// Diagnostic line for state logging; empty while the task is executing.
    pub fn describe_state(&self) -> String {
        self.task
            .try_borrow()
            .map(|t| t.describe_state())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("priority", &self.priority)
            .field("id", &self.id.get())
            .field("context", &self.context.get())
            .finish()
    }
}
