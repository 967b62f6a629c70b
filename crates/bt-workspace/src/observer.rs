//! Execution observer trait for progress reporting and data collection.

use bt_context::TickReport;
use bt_core::ContextId;

/// Callbacks invoked by [`Workspace::exec_agents_observed`][crate::Workspace::exec_agents_observed]
/// around each context's tick.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl ExecObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, context: ContextId, report: &TickReport) {
///         if report.frame % self.interval == 0 {
///             println!("{context} frame {}: ran {} agents", report.frame, report.executed);
///         }
///     }
/// }
/// ```
pub trait ExecObserver {
    /// Called before a context's tick.  `frame` is the number of ticks the
    /// context has completed so far.
    fn on_tick_start(&mut self, _context: ContextId, _frame: u64) {}

    /// Called after a context's tick, once its delay queues were drained and
    /// any configured logging has been done.
    fn on_tick_end(&mut self, _context: ContextId, _report: &TickReport) {}

    /// Called when `cleanup` removes a context from the directory.
    fn on_cleanup(&mut self, _context: ContextId) {}
}

/// An [`ExecObserver`] that does nothing.
pub struct NoopObserver;

impl ExecObserver for NoopObserver {}
