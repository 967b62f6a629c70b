//! Structural save/load of a context's logical state.
//!
//! A [`States`] snapshot records *identities* (agent ids and class names),
//! never addresses.  Loading resolves those identities against the agents
//! currently registered in the context, so the application re-registers its
//! agents (which restores their ids in a deterministic setup) before loading.
//!
//! # What is captured
//!
//! | Field              | Restored by `load`                                  |
//! |--------------------|-----------------------------------------------------|
//! | `named`            | replaces the named-agent map                        |
//! | `static_baselines` | replaces the static-variable baselines              |
//! | `static_values`    | replaces the live static variables                  |
//! | `agents`           | forwarded to each agent's `BehaviorTask::load_state` |
//! | `clock`            | frames and elapsed time (step size is kept)         |
//!
//! Delay queues are never captured: save and load are refused while a tick
//! is executing, and between ticks the queues are empty.

use std::collections::BTreeMap;
use std::rc::Weak;

use bt_agent::{Agent, AgentHandle, StateBlob};
use bt_core::{AgentId, ContextClock, ContextId, Variables};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Context, ContextError, ContextResult};

/// Identity a name was bound to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedBinding {
    pub agent: AgentId,
    pub class: String,
}

/// One agent's opaque execution state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id:       AgentId,
    pub class:    String,
    pub priority: i32,
    pub state:    StateBlob,
}

/// Snapshot of a context's logical state.
///
/// `context_id` names the context the snapshot came from; loading it into a
/// different context is a structural mismatch.  `ContextId::INVALID` (the
/// default) marks a hand-built snapshot that any context accepts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct States {
    pub context_id:       ContextId,
    pub clock:            ContextClock,
    pub named:            BTreeMap<String, NamedBinding>,
    pub static_baselines: BTreeMap<String, Variables>,
    pub static_values:    BTreeMap<String, Variables>,
    pub agents:           Vec<AgentSnapshot>,
}

impl States {
    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> ContextResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ContextResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn mismatch(msg: String) -> ContextError {
    ContextError::StructuralMismatch(msg)
}

impl Context {
    /// Capture bindings, static variables, the clock and every registered
    /// agent's task state.  Only valid between ticks.
    pub fn save(&self) -> ContextResult<States> {
        self.ensure_idle()?;

        let named = self
            .registry
            .bindings()
            .map(|(name, agent)| {
                let binding = NamedBinding {
                    agent: agent.id(),
                    class: agent.class_name().to_owned(),
                };
                (name.to_owned(), binding)
            })
            .collect();

        let agents = self
            .registry
            .handles()
            .into_iter()
            .map(|agent| {
                Ok(AgentSnapshot {
                    id:       agent.id(),
                    class:    agent.class_name().to_owned(),
                    priority: agent.priority(),
                    state:    agent.save_state()?,
                })
            })
            .collect::<ContextResult<Vec<_>>>()?;

        debug!(context = %self.id, agents = agents.len(), "context saved");
        Ok(States {
            context_id:       self.id,
            clock:            self.clock,
            named,
            static_baselines: self.statics.baselines().clone(),
            static_values:    self.statics.live_values().clone(),
            agents,
        })
    }

    /// Restore a snapshot produced by [`save`](Self::save).
    ///
    /// All-or-nothing: every class, binding and agent the snapshot references
    /// is resolved before anything changes, and agent task states are rolled
    /// back if any agent rejects its blob.  Only valid between ticks.
    pub fn load(&mut self, states: &States) -> ContextResult<()> {
        self.ensure_idle()?;

        // ── Validate ──────────────────────────────────────────────────────
        if states.context_id.is_valid() && states.context_id != self.id {
            return Err(mismatch(format!(
                "snapshot was taken from {}, not {}",
                states.context_id, self.id
            )));
        }
        for class in states.static_baselines.keys().chain(states.static_values.keys()) {
            if !self.types.contains_class(class) {
                return Err(mismatch(format!("unknown class '{class}' in static variables")));
            }
        }

        let mut named: BTreeMap<String, Weak<Agent>> = BTreeMap::new();
        for (name, binding) in &states.named {
            let agent = self.resolve(binding.agent, &binding.class)?;
            if !self.types.is_valid_instance_name(name, &binding.class) {
                return Err(mismatch(format!(
                    "'{name}' is not a registered instance name for class '{}'",
                    binding.class
                )));
            }
            named.insert(name.clone(), agent.downgrade());
        }

        let mut targets: Vec<(AgentHandle, &StateBlob)> = Vec::with_capacity(states.agents.len());
        for snap in &states.agents {
            targets.push((self.resolve(snap.id, &snap.class)?, &snap.state));
        }

        // ── Apply ─────────────────────────────────────────────────────────
        restore_agents(&targets)?;
        self.registry.replace_bindings(named);
        self.statics.replace(states.static_baselines.clone(), states.static_values.clone());
        self.clock.frames = states.clock.frames;
        self.clock.elapsed_millis = states.clock.elapsed_millis;

        debug!(context = %self.id, agents = targets.len(), "context loaded");
        Ok(())
    }

    /// A live registered agent with id `id` and class `class`.
    fn resolve(&self, id: AgentId, class: &str) -> ContextResult<AgentHandle> {
        let agent = self
            .registry
            .get(id)
            .ok_or_else(|| mismatch(format!("{id} is not registered in context {}", self.id)))?;
        if agent.class_name() != class {
            return Err(mismatch(format!(
                "{id} has class '{}', snapshot expects '{class}'",
                agent.class_name()
            )));
        }
        Ok(agent)
    }
}

/// Load every blob; on the first failure re-apply the previous blobs of the
/// agents already restored and return the error.
fn restore_agents(targets: &[(AgentHandle, &StateBlob)]) -> ContextResult<()> {
    let mut previous: Vec<(&AgentHandle, StateBlob)> = Vec::with_capacity(targets.len());
    for (agent, blob) in targets {
        let result = agent.save_state().and_then(|before| {
            agent.load_state(blob)?;
            Ok(before)
        });
        match result {
            Ok(before) => previous.push((agent, before)),
            Err(e) => {
                for (agent, before) in previous.into_iter().rev() {
                    if let Err(rollback) = agent.load_state(&before) {
                        warn!(agent = %agent.id(), error = %rollback, "state rollback failed");
                    }
                }
                return Err(e.into());
            }
        }
    }
    Ok(())
}
