//! The `OutputWriter` trait implemented by all backend writers.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{AgentStateRow, OutputResult, StaticChangeRow, TickSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
pub trait OutputWriter {
    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write a batch of static-variable changes.
    fn write_static_changes(&mut self, rows: &[StaticChangeRow]) -> OutputResult<()>;

    /// Write one agent state row.
    fn write_agent_state(&mut self, row: &AgentStateRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// A writer shared by an [`OutputSink`][crate::OutputSink] and an
/// [`OutputObserver`][crate::OutputObserver].
pub type SharedWriter<W> = Rc<RefCell<W>>;

pub fn shared<W: OutputWriter>(writer: W) -> SharedWriter<W> {
    Rc::new(RefCell::new(writer))
}
