//! `AgentRegistry`: bookkeeping of which agents a context observes.
//!
//! # Structures
//!
//! ```text
//! buckets : BTreeMap<priority, BTreeMap<AgentId, Weak<Agent>>>   walk order
//! index   : FxHashMap<AgentId, priority>                          O(1) lookup
//! named   : BTreeMap<String, Weak<Agent>>                         bindings
//! delayed : Vec<Weak<Agent>> × 2                                  tick-transient
//! ```
//!
//! Invariants, checked by [`AgentRegistry::is_consistent`]:
//!
//! - every id in `index` is a member of exactly the bucket it names;
//! - every bucket member is in `index`;
//! - no bucket is empty (at most one bucket per distinct priority).
//!
//! The registry never decides *when* a mutation happens; the owning
//! [`Context`][crate::Context] routes requests made during a tick into the
//! delay queues and applies them afterwards.

use std::collections::BTreeMap;
use std::rc::Weak;

use bt_agent::{Agent, AgentError, AgentHandle, AgentResult, TypeRegistry};
use bt_core::{AgentId, ContextId};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// `true` if `weak` points at `agent`.
#[inline]
fn points_to(weak: &Weak<Agent>, agent: &Agent) -> bool {
    std::ptr::eq(weak.as_ptr(), agent)
}

/// Agent bookkeeping of one context.
pub struct AgentRegistry {
    context_id:    ContextId,
    last_agent_id: u32,
    buckets:       BTreeMap<i32, BTreeMap<AgentId, Weak<Agent>>>,
    index:         FxHashMap<AgentId, i32>,
    named:         BTreeMap<String, Weak<Agent>>,
    delay_added:   Vec<Weak<Agent>>,
    delay_removed: Vec<Weak<Agent>>,
}

impl AgentRegistry {
    pub fn new(context_id: ContextId) -> Self {
        Self {
            context_id,
            last_agent_id: 0,
            buckets:       BTreeMap::new(),
            index:         FxHashMap::default(),
            named:         BTreeMap::new(),
            delay_added:   Vec::new(),
            delay_removed: Vec::new(),
        }
    }

    // ── Id allocation ─────────────────────────────────────────────────────

    /// Next fresh id.  Ids are never recycled within the registry's lifetime,
    /// so `None` once the id space up to `AgentId::INVALID` is used up.
    pub(crate) fn alloc_agent_id(&mut self) -> Option<AgentId> {
        let next = self.last_agent_id.checked_add(1).map(AgentId)?;
        if !next.is_valid() {
            return None;
        }
        self.last_agent_id = next.0;
        Some(next)
    }

    #[cfg(test)]
    pub(crate) fn set_last_agent_id(&mut self, last: u32) {
        self.last_agent_id = last;
    }

    /// The most recently allocated id, or `AgentId(0)` if none yet.
    pub fn last_agent_id(&self) -> AgentId {
        AgentId(self.last_agent_id)
    }

    // ── Immediate mutation ────────────────────────────────────────────────

    /// Register `agent` now.  Returns `false` if nothing changed.
    ///
    /// An agent already present here is left as is; an agent registered in a
    /// different context is refused, since an agent belongs to at most one
    /// context at a time.
    pub(crate) fn insert(&mut self, agent: &Agent) -> bool {
        let owner = agent.context_id();
        if owner == self.context_id && self.index.contains_key(&agent.id()) {
            return false;
        }
        if owner.is_valid() && owner != self.context_id {
            warn!(
                context = %self.context_id,
                owner = %owner,
                agent = agent.name(),
                "agent already registered in another context; add ignored"
            );
            return false;
        }

        let Some(id) = self.alloc_agent_id() else {
            warn!(context = %self.context_id, agent = agent.name(), "agent id space exhausted; add ignored");
            return false;
        };
        let priority = agent.priority();
        self.buckets
            .entry(priority)
            .or_default()
            .insert(id, agent.downgrade());
        self.index.insert(id, priority);
        agent.set_registration(self.context_id, id);
        debug!(context = %self.context_id, agent = %id, priority, class = agent.class_name(), "agent added");
        true
    }

    /// Unregister `agent` now.  Returns `false` if it was not registered here.
    ///
    /// Named bindings that point at the agent are dropped with it, so every
    /// remaining binding resolves to a registered agent.
    pub(crate) fn remove(&mut self, agent: &Agent) -> bool {
        if agent.context_id() != self.context_id {
            return false;
        }
        let id = agent.id();
        let Some(priority) = self.index.remove(&id) else {
            return false;
        };
        self.remove_from_bucket(priority, id);
        self.named.retain(|name, weak| {
            let keep = !points_to(weak, agent);
            if !keep {
                debug!(context = %self.context_id, name = name.as_str(), "binding dropped with agent");
            }
            keep
        });
        agent.clear_registration();
        debug!(context = %self.context_id, agent = %id, priority, "agent removed");
        true
    }

    fn remove_from_bucket(&mut self, priority: i32, id: AgentId) {
        if let Some(bucket) = self.buckets.get_mut(&priority) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.buckets.remove(&priority);
            }
        }
    }

    /// Drop every entry whose agent no longer exists.  Returns how many
    /// registrations were pruned.
    pub(crate) fn prune_stale(&mut self) -> usize {
        let dead: Vec<(i32, AgentId)> = self
            .buckets
            .iter()
            .flat_map(|(&p, bucket)| {
                bucket
                    .iter()
                    .filter(|(_, w)| w.strong_count() == 0)
                    .map(move |(&id, _)| (p, id))
            })
            .collect();
        for &(priority, id) in &dead {
            self.index.remove(&id);
            self.remove_from_bucket(priority, id);
        }
        self.named.retain(|_, w| w.strong_count() > 0);
        if !dead.is_empty() {
            debug!(context = %self.context_id, pruned = dead.len(), "stale agents pruned");
        }
        dead.len()
    }

    /// Forget every registration without touching the agents' lifetimes.
    pub(crate) fn clear(&mut self) {
        for bucket in self.buckets.values() {
            for agent in bucket.values().filter_map(Weak::upgrade) {
                agent.clear_registration();
            }
        }
        self.buckets.clear();
        self.index.clear();
        self.named.clear();
        self.delay_added.clear();
        self.delay_removed.clear();
    }

    // ── Delay queues ──────────────────────────────────────────────────────

    pub(crate) fn defer_add(&mut self, agent: &Agent) {
        self.delay_added.push(agent.downgrade());
    }

    pub(crate) fn defer_remove(&mut self, agent: &Agent) {
        self.delay_removed.push(agent.downgrade());
    }

    /// Take both queues, leaving them empty: `(additions, removals)`.
    pub(crate) fn take_delayed(&mut self) -> (Vec<Weak<Agent>>, Vec<Weak<Agent>>) {
        (
            std::mem::take(&mut self.delay_added),
            std::mem::take(&mut self.delay_removed),
        )
    }

    /// Number of queued additions.
    pub fn pending_additions(&self) -> usize {
        self.delay_added.len()
    }

    /// Number of queued removals.
    pub fn pending_removals(&self) -> usize {
        self.delay_removed.len()
    }

    fn is_pending_add(&self, agent: &Agent) -> bool {
        self.delay_added.iter().any(|w| points_to(w, agent))
    }

    // ── Named bindings ────────────────────────────────────────────────────

    /// Bind `name` to `agent`.
    ///
    /// Fails if `name` is not a registered instance name for the agent's
    /// class (or an ancestor), if the agent is registered in another context
    /// or neither registered here nor queued for addition, or if `name` is
    /// bound to a different live agent.  A binding made while the agent is
    /// queued is dropped again if the queued addition is refused.
    /// Binding the same name to the same agent again succeeds.
    pub(crate) fn bind(&mut self, types: &TypeRegistry, name: &str, agent: &Agent) -> AgentResult<()> {
        if !types.is_valid_instance_name(name, agent.class_name()) {
            return Err(AgentError::UnregisteredName {
                name:  name.to_owned(),
                class: agent.class_name().to_owned(),
            });
        }
        let owner = agent.context_id();
        if owner.is_valid() && owner != self.context_id {
            return Err(AgentError::NotRegistered(agent.name().to_owned()));
        }
        if !self.contains(agent) && !self.is_pending_add(agent) {
            return Err(AgentError::NotRegistered(agent.name().to_owned()));
        }
        if let Some(existing) = self.named.get(name) {
            if points_to(existing, agent) {
                return Ok(());
            }
            if existing.strong_count() > 0 {
                return Err(AgentError::NameAlreadyBound(name.to_owned()));
            }
        }
        self.named.insert(name.to_owned(), agent.downgrade());
        debug!(context = %self.context_id, name, agent = agent.name(), "instance bound");
        Ok(())
    }

    pub(crate) fn unbind(&mut self, name: &str) -> AgentResult<()> {
        match self.named.remove(name) {
            Some(weak) if weak.strong_count() > 0 => {
                debug!(context = %self.context_id, name, "instance unbound");
                Ok(())
            }
            _ => Err(AgentError::NameNotBound(name.to_owned())),
        }
    }

    /// The live agent bound to `name`.
    pub fn instance(&self, name: &str) -> Option<AgentHandle> {
        self.named.get(name).and_then(Weak::upgrade)
    }

    /// Live bindings in ascending name order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, AgentHandle)> + '_ {
        self.named
            .iter()
            .filter_map(|(name, w)| w.upgrade().map(|a| (name.as_str(), a)))
    }

    pub fn binding_count(&self) -> usize {
        self.named.values().filter(|w| w.strong_count() > 0).count()
    }

    /// Drop every binding that points at `agent`.  Returns how many went.
    pub(crate) fn unbind_agent(&mut self, agent: &Agent) -> usize {
        let before = self.named.len();
        self.named.retain(|_, weak| !points_to(weak, agent));
        let dropped = before - self.named.len();
        if dropped > 0 {
            debug!(context = %self.context_id, agent = agent.name(), dropped, "bindings to refused agent dropped");
        }
        dropped
    }

    pub(crate) fn clear_bindings(&mut self) {
        self.named.clear();
    }

    pub(crate) fn replace_bindings(&mut self, named: BTreeMap<String, Weak<Agent>>) {
        self.named = named;
    }

    // ── Read views ────────────────────────────────────────────────────────

    /// Number of registered agents (live or not yet pruned).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// `true` if `agent` is currently registered here.
    pub fn contains(&self, agent: &Agent) -> bool {
        agent.context_id() == self.context_id && self.index.contains_key(&agent.id())
    }

    /// The live agent registered under `id`.
    pub fn get(&self, id: AgentId) -> Option<AgentHandle> {
        let priority = self.index.get(&id)?;
        self.buckets.get(priority)?.get(&id)?.upgrade()
    }

    /// Priority of the bucket holding `id`.
    pub fn priority_of(&self, id: AgentId) -> Option<i32> {
        self.index.get(&id).copied()
    }

    /// Distinct priorities in ascending (execution) order.
    pub fn priorities(&self) -> Vec<i32> {
        self.buckets.keys().copied().collect()
    }

    /// Member ids of the `priority` bucket in ascending order.
    pub fn bucket_ids(&self, priority: i32) -> Vec<AgentId> {
        self.buckets
            .get(&priority)
            .map(|b| b.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Execution-ordered snapshot of every registration, live or stale.
    ///
    /// The walk iterates this owned copy, so the registry itself stays free
    /// to be borrowed by the tasks it drives.
    pub(crate) fn walk_order(&self) -> Vec<Weak<Agent>> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values().cloned())
            .collect()
    }

    /// Live agents in execution order.
    pub fn handles(&self) -> Vec<AgentHandle> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values().filter_map(Weak::upgrade))
            .collect()
    }

    /// Check the id-index / bucket invariants.
    pub fn is_consistent(&self) -> bool {
        let members: usize = self.buckets.values().map(BTreeMap::len).sum();
        if members != self.index.len() {
            return false;
        }
        if self.buckets.values().any(BTreeMap::is_empty) {
            return false;
        }
        self.index.iter().all(|(id, priority)| {
            self.buckets
                .get(priority)
                .is_some_and(|bucket| bucket.contains_key(id))
        })
    }
}
