//! The per-context tick: walk, drain, prune, advance.

use std::ops::AddAssign;

use bt_agent::TaskStatus;
use tracing::{trace, warn};

use crate::Context;

/// What one call to [`Context::exec_agents`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Frame count after the tick (unchanged if the tick was refused).
    pub frame:    u64,
    /// Agents whose task ran.
    pub executed: usize,
    pub success:  usize,
    pub failure:  usize,
    pub running:  usize,
    /// Registrations skipped because the owner had dropped the agent.
    pub stale:    usize,
    /// Deferred additions applied after the walk.
    pub added:    usize,
    /// Deferred removals applied after the walk.
    pub removed:  usize,
}

impl TickReport {
    fn record(&mut self, status: TaskStatus) {
        self.executed += 1;
        match status {
            TaskStatus::Success => self.success += 1,
            TaskStatus::Failure => self.failure += 1,
            TaskStatus::Running => self.running += 1,
        }
    }
}

/// Sum of several reports, e.g. across every context of a workspace.
/// `frame` keeps the largest value seen.
impl AddAssign for TickReport {
    fn add_assign(&mut self, rhs: TickReport) {
        self.frame = self.frame.max(rhs.frame);
        self.executed += rhs.executed;
        self.success += rhs.success;
        self.failure += rhs.failure;
        self.running += rhs.running;
        self.stale += rhs.stale;
        self.added += rhs.added;
        self.removed += rhs.removed;
    }
}

impl Context {
    /// Run one tick: every registered agent's task exactly once, in
    /// ascending priority and then ascending id order.
    ///
    /// `add_agent`/`remove_agent` calls made while the walk is in progress
    /// are queued; they are applied after the walk (additions first, each
    /// queue in FIFO order) and are visible from the next tick on.
    ///
    /// A call on a context that is already executing is refused and returns
    /// an empty report; callers check [`is_executing`](Self::is_executing)
    /// beforehand.
    pub fn exec_agents(&mut self) -> TickReport {
        if self.executing {
            warn!(context = %self.id, "exec_agents called while already executing; ignored");
            return TickReport { frame: self.clock.frames, ..Default::default() };
        }

        let mut report = TickReport::default();

        // ── Walk ──────────────────────────────────────────────────────────
        //
        // Iterate an owned snapshot so tasks can borrow `self` mutably.
        self.executing = true;
        for weak in self.registry.walk_order() {
            let Some(agent) = weak.upgrade() else {
                report.stale += 1;
                continue;
            };
            match agent.exec(self) {
                Some(status) => report.record(status),
                None => warn!(context = %self.id, agent = %agent.id(), "task already running; skipped"),
            }
        }
        self.executing = false;

        // ── Drain delay queues ────────────────────────────────────────────
        let (additions, removals) = self.registry.take_delayed();
        for agent in additions.iter().filter_map(|w| w.upgrade()) {
            if self.registry.insert(&agent) {
                report.added += 1;
            } else if !self.registry.contains(&agent) {
                // Refused: names bound while it was queued must not outlive it.
                self.registry.unbind_agent(&agent);
            }
        }
        for agent in removals.iter().filter_map(|w| w.upgrade()) {
            if self.registry.remove(&agent) {
                report.removed += 1;
            }
        }

        self.registry.prune_stale();
        self.clock.advance();
        report.frame = self.clock.frames;

        trace!(
            context = %self.id,
            frame = report.frame,
            executed = report.executed,
            added = report.added,
            removed = report.removed,
            "tick complete"
        );
        report
    }
}
