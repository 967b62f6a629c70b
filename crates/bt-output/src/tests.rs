//! Integration tests for bt-output.

use std::rc::Rc;

use bt_agent::{Agent, NoopTask, TypeRegistry, TypeRegistryBuilder};
use bt_context::{Context, TickReport};
use bt_core::{ContextId, Value};

use crate::{
    AgentStateRow, OutputError, OutputResult, OutputWriter, StaticChangeRow, TickSummaryRow,
};

fn types() -> Rc<TypeRegistry> {
    let types = TypeRegistryBuilder::new()
        .class("Npc")
        .static_var("Npc", "mood", Value::from("calm"))
        .static_var("Npc", "count", Value::Int(0))
        .build()
        .unwrap();
    Rc::new(types)
}

fn read_rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().map(|r| r.unwrap()).collect()
}

/// A writer whose every write fails.
struct BrokenWriter;

impl OutputWriter for BrokenWriter {
    fn write_tick_summary(&mut self, _: &TickSummaryRow) -> OutputResult<()> {
        Err(OutputError::Io(std::io::Error::other("broken")))
    }

    fn write_static_changes(&mut self, _: &[StaticChangeRow]) -> OutputResult<()> {
        Err(OutputError::Io(std::io::Error::other("broken")))
    }

    fn write_agent_state(&mut self, _: &AgentStateRow) -> OutputResult<()> {
        Err(OutputError::Io(std::io::Error::other("broken")))
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::CsvWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("tick_summaries.csv").exists());
        assert!(dir.path().join("static_changes.csv").exists());
        assert!(dir.path().join("agent_states.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("static_changes.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["context_id", "frame", "class", "name", "old", "new"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr2.headers().unwrap().len(), 9);
    }

    #[test]
    fn tick_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let report = TickReport { frame: 4, executed: 2, success: 1, running: 1, ..Default::default() };
        w.write_tick_summary(&TickSummaryRow::from_report(ContextId(7), &report)).unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "7"); // context_id
        assert_eq!(&rows[0][1], "4"); // frame
        assert_eq!(&rows[0][2], "2"); // executed
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod sink_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{CsvWriter, OutputSink, shared};

    #[test]
    fn static_changes_become_rows() {
        let dir = TempDir::new().unwrap();
        let writer = shared(CsvWriter::new(dir.path()).unwrap());
        let mut sink = OutputSink::new(Rc::clone(&writer));
        let mut ctx = Context::new(ContextId(0), types());

        assert_eq!(ctx.log_static_variables(None, &mut sink).unwrap(), 2);
        ctx.set_static_var("Npc", "count", Value::Int(5)).unwrap();
        assert_eq!(ctx.log_static_variables(None, &mut sink).unwrap(), 1);
        writer.borrow_mut().finish().unwrap();

        let rows = read_rows(&dir.path().join("static_changes.csv"));
        assert_eq!(rows.len(), 3);
        // First log: every field is new, sorted by name.
        assert_eq!(&rows[0][3], "count");
        assert_eq!(&rows[0][4], "");
        assert_eq!(&rows[1][3], "mood");
        assert_eq!(&rows[1][5], "calm");
        // Second log: only the change.
        assert_eq!(&rows[2][4], "0");
        assert_eq!(&rows[2][5], "5");
    }

    #[test]
    fn agent_states_become_rows() {
        let dir = TempDir::new().unwrap();
        let writer = shared(CsvWriter::new(dir.path()).unwrap());
        let mut sink = OutputSink::new(Rc::clone(&writer));
        let mut ctx = Context::new(ContextId(3), types());
        let npc = Agent::named("bob", "Npc", 0, NoopTask);
        ctx.add_agent(&npc);

        ctx.log_current_state(&mut sink).unwrap();
        writer.borrow_mut().finish().unwrap();

        let rows = read_rows(&dir.path().join("agent_states.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][2], "1");
        assert_eq!(&rows[0][4], "bob");
    }

    #[test]
    fn failed_write_keeps_baseline() {
        let mut broken = OutputSink::new(shared(BrokenWriter));
        let mut ctx = Context::new(ContextId(0), types());
        assert!(ctx.log_static_variables(None, &mut broken).is_err());
        assert_eq!(ctx.statics().pending_changes("Npc").len(), 2);
    }
}

#[cfg(test)]
mod observer_tests {
    use bt_workspace::WorkspaceBuilder;
    use tempfile::TempDir;

    use super::*;
    use crate::{CsvWriter, OutputObserver, OutputSink, shared};

    #[test]
    fn one_summary_row_per_context_tick() {
        let dir = TempDir::new().unwrap();
        let writer = shared(CsvWriter::new(dir.path()).unwrap());
        let mut ws = WorkspaceBuilder::new(types())
            .sink(OutputSink::new(Rc::clone(&writer)))
            .build()
            .unwrap();
        let a = Agent::new("Npc", 0, NoopTask);
        ws.context(ContextId(0)).unwrap().add_agent(&a);
        ws.context(ContextId(1)).unwrap();

        let mut obs = OutputObserver::new(writer);
        ws.exec_agents_observed(ContextId::ALL, &mut obs).unwrap();
        ws.exec_agents_observed(ContextId::ALL, &mut obs).unwrap();
        assert!(obs.take_error().is_none());
        obs.finish().unwrap();

        let rows = read_rows(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][2], "1");
        assert_eq!(&rows[1][0], "1");
        assert_eq!(&rows[1][2], "0");
        assert_eq!(&rows[3][1], "2");
    }

    #[test]
    fn write_errors_are_stored() {
        let mut ws = WorkspaceBuilder::new(types()).build().unwrap();
        let mut obs = OutputObserver::new(shared(BrokenWriter));
        ws.exec_agents_observed(ContextId(0), &mut obs).unwrap();
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
        obs.finish().unwrap();
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::*;
    use crate::{OutputSink, SqliteWriter, shared};

    #[test]
    fn rows_land_in_tables() {
        let dir = TempDir::new().unwrap();
        let writer = shared(SqliteWriter::new(dir.path()).unwrap());
        let mut sink = OutputSink::new(Rc::clone(&writer));
        let mut ctx = Context::new(ContextId(0), types());
        let npc = Agent::new("Npc", 0, NoopTask);
        ctx.add_agent(&npc);

        let report = ctx.exec_agents();
        ctx.log_current_state(&mut sink).unwrap();
        {
            let mut w = writer.borrow_mut();
            w.write_tick_summary(&TickSummaryRow::from_report(ctx.id(), &report)).unwrap();
            w.finish().unwrap();
        }

        let conn = Connection::open(dir.path().join("output.db")).unwrap();
        let count = |table: &str| -> i64 {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
        };
        assert_eq!(count("tick_summaries"), 1);
        assert_eq!(count("agent_states"), 1);
        assert_eq!(count("static_changes"), 2);
    }
}
