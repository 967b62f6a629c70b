//! `OutputSink<W>`: bridges `LogSink` to an `OutputWriter`.

use bt_agent::Agent;
use bt_context::{LogError, LogResult, LogSink};
use bt_core::{ContextId, VarChange};

use crate::row::{AgentStateRow, StaticChangeRow};
use crate::writer::{OutputWriter, SharedWriter};
use crate::{OutputError, OutputResult};

/// A [`LogSink`] that records static-variable diffs and agent state lines
/// through any [`OutputWriter`] backend.
///
/// Write failures are returned to the context as [`LogError::Sink`], so the
/// static tracker keeps the affected baseline and the diff is reported again
/// on the next log.
pub struct OutputSink<W: OutputWriter> {
    writer: SharedWriter<W>,
}

impl<W: OutputWriter> OutputSink<W> {
    pub fn new(writer: SharedWriter<W>) -> Self {
        Self { writer }
    }

    fn with_writer(&self, f: impl FnOnce(&mut W) -> OutputResult<()>) -> LogResult<()> {
        let mut writer = self
            .writer
            .try_borrow_mut()
            .map_err(|_| LogError::Sink(OutputError::Busy.to_string()))?;
        f(&mut *writer).map_err(|e| LogError::Sink(e.to_string()))
    }
}

impl<W: OutputWriter> LogSink for OutputSink<W> {
    fn log_static_changes(
        &mut self,
        context: ContextId,
        frame:   u64,
        class:   &str,
        changes: &[VarChange],
    ) -> LogResult<()> {
        let rows: Vec<StaticChangeRow> = changes
            .iter()
            .map(|c| StaticChangeRow::from_change(context, frame, class, c))
            .collect();
        self.with_writer(|w| w.write_static_changes(&rows))
    }

    fn log_agent_state(
        &mut self,
        context: ContextId,
        frame:   u64,
        agent:   &Agent,
        state:   &str,
    ) -> LogResult<()> {
        let row = AgentStateRow::from_agent(context, frame, agent, state);
        self.with_writer(|w| w.write_agent_state(&row))
    }
}
