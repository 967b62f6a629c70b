//! The `Context`: one scheduling and registry unit under a `ContextId`.

use std::rc::Rc;

use bt_agent::{Agent, AgentHandle, AgentResult, TaskContext, TypeRegistry};
use bt_core::{AgentId, ContextClock, ContextId, Value, Variables};
use tracing::debug;

use crate::{AgentRegistry, ContextError, ContextResult, LogSink, StaticTracker};

/// A set of agents scheduled together.
///
/// `Context` observes agents; it never owns them.  Dropping a context clears
/// the registration of every agent it still holds but leaves the agents
/// alive for their owners.
///
/// Create directly with [`Context::new`] or through a workspace directory,
/// which records that it created the context itself.
pub struct Context {
    pub(crate) id:            ContextId,
    pub(crate) types:         Rc<TypeRegistry>,
    pub(crate) registry:      AgentRegistry,
    pub(crate) statics:       StaticTracker,
    pub(crate) clock:         ContextClock,
    pub(crate) executing:     bool,
    created_by_me:            bool,
}

impl Context {
    /// Create an empty context consulting `types` for class information.
    ///
    /// Live static variables are seeded from the registry's declarations.
    pub fn new(id: ContextId, types: Rc<TypeRegistry>) -> Self {
        let statics = StaticTracker::seeded(&types);
        Self {
            id,
            registry: AgentRegistry::new(id),
            statics,
            types,
            clock: ContextClock::default(),
            executing: false,
            created_by_me: false,
        }
    }

    /// Advance the clock by `step_millis` after every tick.
    pub fn with_step_millis(mut self, step_millis: u32) -> Self {
        self.clock.step_millis = step_millis;
        self
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// `true` only while [`exec_agents`](Self::exec_agents) is walking.
    pub fn is_executing(&self) -> bool {
        self.executing
    }

    /// `true` if a workspace directory instantiated this context and is
    /// therefore responsible for destroying it.
    pub fn created_by_me(&self) -> bool {
        self.created_by_me
    }

    /// Set by a workspace directory when it creates the context.
    #[doc(hidden)]
    pub fn set_created_by_me(&mut self, created: bool) {
        self.created_by_me = created;
    }

    pub fn clock(&self) -> ContextClock {
        self.clock
    }

    /// Mutable clock access for externally driven time.
    pub fn clock_mut(&mut self) -> &mut ContextClock {
        &mut self.clock
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    // ── Agent registry ────────────────────────────────────────────────────

    /// Register `agent`.  During a tick the request is queued and applied
    /// once the walk has finished.
    pub fn add_agent(&mut self, agent: &Agent) {
        if self.executing {
            debug!(context = %self.id, agent = agent.name(), "add deferred until end of tick");
            self.registry.defer_add(agent);
        } else {
            self.registry.insert(agent);
        }
    }

    /// Unregister `agent`.  During a tick the request is queued and applied
    /// once the walk has finished.  Removing an absent agent is a no-op.
    pub fn remove_agent(&mut self, agent: &Agent) {
        if self.executing {
            debug!(context = %self.id, agent = agent.name(), "remove deferred until end of tick");
            self.registry.defer_remove(agent);
        } else {
            self.registry.remove(agent);
        }
    }

    pub fn agent_count(&self) -> usize {
        self.registry.len()
    }

    pub fn contains_agent(&self, agent: &Agent) -> bool {
        self.registry.contains(agent)
    }

    pub fn agent(&self, id: AgentId) -> Option<AgentHandle> {
        self.registry.get(id)
    }

    /// Live agents in execution order (priority, then id).
    pub fn agents(&self) -> Vec<AgentHandle> {
        self.registry.handles()
    }

    /// Read-only access to the registry's views.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    // ── Named instances ───────────────────────────────────────────────────

    /// Bind `name` to `agent`; see [`AgentRegistry`] for the failure cases.
    pub fn bind_instance(&mut self, name: &str, agent: &Agent) -> AgentResult<()> {
        self.registry.bind(&self.types, name, agent)
    }

    pub fn unbind_instance(&mut self, name: &str) -> AgentResult<()> {
        self.registry.unbind(name)
    }

    /// The agent bound to `name`, or `None`.  Never creates.
    pub fn instance(&self, name: &str) -> Option<AgentHandle> {
        self.registry.instance(name)
    }

    /// Drop every named binding.  Agents are untouched.
    pub fn cleanup_instances(&mut self) {
        self.registry.clear_bindings();
    }

    // ── Static variables ──────────────────────────────────────────────────

    pub fn static_var(&self, class: &str, name: &str) -> Option<&Value> {
        self.statics.get(class, name)
    }

    pub fn set_static_var(&mut self, class: &str, name: &str, value: Value) -> AgentResult<()> {
        self.statics.set(&self.types, class, name, value)
    }

    /// Live static variables of `class`.
    pub fn static_vars(&self, class: &str) -> Option<&Variables> {
        self.statics.live(class)
    }

    pub fn statics(&self) -> &StaticTracker {
        &self.statics
    }

    /// Log changed static variables of `class`, or of every class when
    /// `None`, then commit the logged values as the new baseline.
    ///
    /// Returns the number of changed fields emitted.
    pub fn log_static_variables(
        &mut self,
        class: Option<&str>,
        sink:  &mut dyn LogSink,
    ) -> ContextResult<usize> {
        if let Some(c) = class {
            if !self.types.contains_class(c) {
                return Err(bt_agent::AgentError::UnknownClass(c.to_owned()).into());
            }
        }
        Ok(self.statics.log(self.id, self.clock.frames, class, sink)?)
    }

    /// Drop every static-variable baseline.
    pub fn cleanup_static_variables(&mut self) {
        self.statics.clear_baselines();
    }

    /// Log every agent's state diagnostic (execution order), then the
    /// changed static variables of all classes.
    ///
    /// Returns the number of records emitted.
    pub fn log_current_state(&mut self, sink: &mut dyn LogSink) -> ContextResult<usize> {
        let frame = self.clock.frames;
        let mut records = 0;
        for agent in self.registry.handles() {
            sink.log_agent_state(self.id, frame, &agent, &agent.describe_state())?;
            records += 1;
        }
        records += self.log_static_variables(None, sink)?;
        Ok(records)
    }

    /// Release bindings, baselines and any queued requests.  Registered
    /// agents are unregistered but stay alive.
    pub fn release(&mut self) {
        self.registry.clear();
        self.statics.clear_baselines();
        debug!(context = %self.id, "context released");
    }

    pub(crate) fn ensure_idle(&self) -> ContextResult<()> {
        if self.executing {
            return Err(ContextError::Executing(self.id));
        }
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.registry.clear();
    }
}

// ── TaskContext ───────────────────────────────────────────────────────────────

impl TaskContext for Context {
    fn context_id(&self) -> ContextId {
        self.id
    }

    fn clock(&self) -> ContextClock {
        self.clock
    }

    fn is_executing(&self) -> bool {
        self.executing
    }

    fn add_agent(&mut self, agent: &Agent) {
        Context::add_agent(self, agent);
    }

    fn remove_agent(&mut self, agent: &Agent) {
        Context::remove_agent(self, agent);
    }

    fn bind_instance(&mut self, name: &str, agent: &Agent) -> AgentResult<()> {
        Context::bind_instance(self, name, agent)
    }

    fn unbind_instance(&mut self, name: &str) -> AgentResult<()> {
        Context::unbind_instance(self, name)
    }

    fn instance(&self, name: &str) -> Option<AgentHandle> {
        Context::instance(self, name)
    }

    fn static_var(&self, class: &str, name: &str) -> Option<&Value> {
        Context::static_var(self, class, name)
    }

    fn set_static_var(&mut self, class: &str, name: &str, value: Value) -> AgentResult<()> {
        Context::set_static_var(self, class, name, value)
    }
}
