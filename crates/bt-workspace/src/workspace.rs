//! The `Workspace` struct: an explicit directory of contexts.

use std::collections::BTreeMap;
use std::rc::Rc;

use bt_agent::TypeRegistry;
use bt_context::{Context, LogSink, TickReport};
use bt_core::{ContextId, WorkspaceConfig};
use tracing::{debug, info, warn};

use crate::{ExecObserver, NoopObserver, WorkspaceError, WorkspaceResult};

/// Owner of every context of an application, keyed by [`ContextId`].
///
/// Contexts are created on first lookup with [`context`](Self::context), or
/// constructed by the caller and handed over with
/// [`insert_context`](Self::insert_context).  Either way the workspace owns
/// them until [`cleanup`](Self::cleanup), which drops the ones it created and
/// returns the others to the caller.
///
/// Create via [`WorkspaceBuilder`][crate::WorkspaceBuilder].
pub struct Workspace {
    config:   WorkspaceConfig,
    types:    Rc<TypeRegistry>,
    contexts: BTreeMap<ContextId, Context>,
    sink:     Box<dyn LogSink>,
}

impl Workspace {
    pub(crate) fn new(
        config: WorkspaceConfig,
        types:  Rc<TypeRegistry>,
        sink:   Box<dyn LogSink>,
    ) -> Self {
        Self { config, types, contexts: BTreeMap::new(), sink }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// The type registry shared by every context this workspace creates.
    pub fn types(&self) -> &Rc<TypeRegistry> {
        &self.types
    }

    /// Swap the log sink, returning the previous one.
    pub fn replace_sink(&mut self, sink: Box<dyn LogSink>) -> Box<dyn LogSink> {
        std::mem::replace(&mut self.sink, sink)
    }

    // ── Directory ─────────────────────────────────────────────────────────

    /// The context registered under `id`, created on first use.
    ///
    /// A created context shares the workspace's type registry, advances its
    /// clock by `config.tick_duration_millis` per tick and is marked as
    /// created by the directory.  `ContextId::ALL` and other negative ids are
    /// rejected.
    pub fn context(&mut self, id: ContextId) -> WorkspaceResult<&mut Context> {
        if !id.is_concrete() {
            return Err(WorkspaceError::InvalidContextId(id));
        }
        let types = &self.types;
        let step = self.config.tick_duration_millis;
        Ok(self.contexts.entry(id).or_insert_with(|| {
            let mut ctx = Context::new(id, Rc::clone(types)).with_step_millis(step);
            ctx.set_created_by_me(true);
            info!(context = %id, "context created");
            ctx
        }))
    }

    /// Look up without creating.
    pub fn find_context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(&id)
    }

    pub fn find_context_mut(&mut self, id: ContextId) -> Option<&mut Context> {
        self.contexts.get_mut(&id)
    }

    /// Register a context constructed by the caller.  It is returned by
    /// [`cleanup`](Self::cleanup) instead of being dropped.
    pub fn insert_context(&mut self, mut ctx: Context) -> WorkspaceResult<()> {
        let id = ctx.id();
        if !id.is_concrete() {
            return Err(WorkspaceError::InvalidContextId(id));
        }
        if self.contexts.contains_key(&id) {
            return Err(WorkspaceError::DuplicateContext(id));
        }
        ctx.set_created_by_me(false);
        self.contexts.insert(id, ctx);
        info!(context = %id, "external context registered");
        Ok(())
    }

    /// Registered ids in ascending order.
    pub fn context_ids(&self) -> Vec<ContextId> {
        self.contexts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Tick the context `id` (created if absent), or every context in
    /// ascending id order for `ContextId::ALL`.
    ///
    /// Returns the sum of the per-context reports.
    pub fn exec_agents(&mut self, id: ContextId) -> WorkspaceResult<TickReport> {
        self.exec_agents_observed(id, &mut NoopObserver)
    }

    /// [`exec_agents`](Self::exec_agents) with observer callbacks around
    /// each context's tick.
    ///
    /// A log sink failure does not stop the loop: every target still ticks
    /// and reaches `on_tick_end`, and the first logging error is returned
    /// once all targets are done.
    pub fn exec_agents_observed<O: ExecObserver>(
        &mut self,
        id:       ContextId,
        observer: &mut O,
    ) -> WorkspaceResult<TickReport> {
        let mut total = TickReport::default();
        let mut first_err: Option<WorkspaceError> = None;
        for target in self.targets(id, true)? {
            let (report, logged) = self.exec_one(target, observer);
            total += report;
            if let Err(e) = logged {
                warn!(context = %target, error = %e, "tick logging failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }

    /// Tick one context, then run the configured logging.  The report is
    /// returned even when logging fails.
    fn exec_one<O: ExecObserver>(
        &mut self,
        id:       ContextId,
        observer: &mut O,
    ) -> (TickReport, WorkspaceResult<()>) {
        let Some(ctx) = self.contexts.get_mut(&id) else {
            return (TickReport::default(), Ok(()));
        };
        let sink = self.sink.as_mut();

        observer.on_tick_start(id, ctx.clock().frames);
        let report = ctx.exec_agents();

        let mut logged = Ok(());
        if self.config.log_static_variables_on_tick {
            logged = ctx.log_static_variables(None, sink).map(drop);
        }
        if logged.is_ok() && self.config.state_log_due(report.frame) {
            logged = ctx.log_current_state(sink).map(|records| {
                debug!(context = %id, frame = report.frame, records, "periodic state log");
            });
        }

        observer.on_tick_end(id, &report);
        (report, logged.map_err(WorkspaceError::from))
    }

    // ── Logging ───────────────────────────────────────────────────────────

    /// Log the current state of context `id`, or of every context, through
    /// the workspace sink.  Unknown single ids log nothing.
    ///
    /// Returns the number of records emitted.
    pub fn log_current_states(&mut self, id: ContextId) -> WorkspaceResult<usize> {
        let mut records = 0;
        for target in self.targets(id, false)? {
            if let Some(ctx) = self.contexts.get_mut(&target) {
                records += ctx.log_current_state(self.sink.as_mut())?;
            }
        }
        Ok(records)
    }

    // ── Cleanup ───────────────────────────────────────────────────────────

    /// Release and remove context `id`, or every context for
    /// `ContextId::ALL`.
    ///
    /// Each removed context drops its named bindings and static baselines
    /// and unregisters its agents (the agents stay alive for their owners).
    /// Contexts the directory created are dropped; contexts registered with
    /// [`insert_context`](Self::insert_context) are returned to the caller.
    /// Cleaning up an unknown id is a no-op.
    pub fn cleanup(&mut self, id: ContextId) -> WorkspaceResult<Vec<Context>> {
        self.cleanup_observed(id, &mut NoopObserver)
    }

    pub fn cleanup_observed<O: ExecObserver>(
        &mut self,
        id:       ContextId,
        observer: &mut O,
    ) -> WorkspaceResult<Vec<Context>> {
        let mut returned = Vec::new();
        for target in self.targets(id, false)? {
            let Some(mut ctx) = self.contexts.remove(&target) else {
                continue;
            };
            ctx.release();
            observer.on_cleanup(target);
            if ctx.created_by_me() {
                info!(context = %target, "context destroyed");
            } else {
                info!(context = %target, "external context returned to owner");
                returned.push(ctx);
            }
        }
        Ok(returned)
    }

    /// Resolve `id` to the contexts an operation applies to.  With `create`,
    /// a single absent id is created first.
    fn targets(&mut self, id: ContextId, create: bool) -> WorkspaceResult<Vec<ContextId>> {
        if id.is_all() {
            return Ok(self.context_ids());
        }
        if !id.is_concrete() {
            return Err(WorkspaceError::InvalidContextId(id));
        }
        if create {
            self.context(id)?;
        }
        Ok(vec![id])
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("config", &self.config)
            .field("contexts", &self.context_ids())
            .finish_non_exhaustive()
    }
}
