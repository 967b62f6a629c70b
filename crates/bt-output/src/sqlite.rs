//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `tick_summaries`, `static_changes` and `agent_states`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentStateRow, OutputResult, StaticChangeRow, TickSummaryRow};

/// Writes runtime output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 context_id INTEGER NOT NULL,
                 frame      INTEGER NOT NULL,
                 executed   INTEGER NOT NULL,
                 success    INTEGER NOT NULL,
                 failure    INTEGER NOT NULL,
                 running    INTEGER NOT NULL,
                 added      INTEGER NOT NULL,
                 removed    INTEGER NOT NULL,
                 stale      INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS static_changes (
                 context_id INTEGER NOT NULL,
                 frame      INTEGER NOT NULL,
                 class      TEXT    NOT NULL,
                 name       TEXT    NOT NULL,
                 old        TEXT    NOT NULL,
                 new        TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS agent_states (
                 context_id INTEGER NOT NULL,
                 frame      INTEGER NOT NULL,
                 agent_id   INTEGER NOT NULL,
                 class      TEXT    NOT NULL,
                 name       TEXT    NOT NULL,
                 state      TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (context_id, frame, executed, success, failure, running, added, removed, stale) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                row.context_id,
                row.frame,
                row.executed,
                row.success,
                row.failure,
                row.running,
                row.added,
                row.removed,
                row.stale,
            ],
        )?;
        Ok(())
    }

    fn write_static_changes(&mut self, rows: &[StaticChangeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO static_changes (context_id, frame, class, name, old, new) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.context_id,
                    row.frame,
                    row.class,
                    row.name,
                    row.old,
                    row.new,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_agent_state(&mut self, row: &AgentStateRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO agent_states (context_id, frame, agent_id, class, name, state) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![row.context_id, row.frame, row.agent_id, row.class, row.name, row.state],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
