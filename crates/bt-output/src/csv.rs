//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `tick_summaries.csv`
//! - `static_changes.csv`
//! - `agent_states.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentStateRow, OutputResult, StaticChangeRow, TickSummaryRow};

/// Writes runtime output to three CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    statics:   Writer<File>,
    states:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "context_id", "frame", "executed", "success", "failure", "running", "added", "removed",
            "stale",
        ])?;

        let mut statics = Writer::from_path(dir.join("static_changes.csv"))?;
        statics.write_record(["context_id", "frame", "class", "name", "old", "new"])?;

        let mut states = Writer::from_path(dir.join("agent_states.csv"))?;
        states.write_record(["context_id", "frame", "agent_id", "class", "name", "state"])?;

        Ok(Self { summaries, statics, states, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.context_id.to_string(),
            row.frame.to_string(),
            row.executed.to_string(),
            row.success.to_string(),
            row.failure.to_string(),
            row.running.to_string(),
            row.added.to_string(),
            row.removed.to_string(),
            row.stale.to_string(),
        ])?;
        Ok(())
    }

    fn write_static_changes(&mut self, rows: &[StaticChangeRow]) -> OutputResult<()> {
        for row in rows {
            self.statics.write_record([
                row.context_id.to_string().as_str(),
                row.frame.to_string().as_str(),
                row.class.as_str(),
                row.name.as_str(),
                row.old.as_str(),
                row.new.as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_agent_state(&mut self, row: &AgentStateRow) -> OutputResult<()> {
        self.states.write_record([
            row.context_id.to_string().as_str(),
            row.frame.to_string().as_str(),
            row.agent_id.to_string().as_str(),
            row.class.as_str(),
            row.name.as_str(),
            row.state.as_str(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.statics.flush()?;
        self.states.flush()?;
        Ok(())
    }
}
