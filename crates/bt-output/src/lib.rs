//! `bt-output`: output writers for the rust_bt runtime.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                   |
//! |-----------|---------|-----------------------------------------------------------------|
//! | *(none)*  | CSV     | `tick_summaries.csv`, `static_changes.csv`, `agent_states.csv`  |
//! | `sqlite`  | SQLite  | `output.db`                                                     |
//!
//! All backends implement [`OutputWriter`].  A writer is shared between two
//! adapters:
//!
//! - [`OutputSink`] implements `bt_context::LogSink` and records static
//!   variable diffs and agent state lines;
//! - [`OutputObserver`] implements `bt_workspace::ExecObserver` and records
//!   one summary row per context tick.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bt_output::{CsvWriter, OutputObserver, OutputSink, shared};
//!
//! let writer = shared(CsvWriter::new(Path::new("./output"))?);
//! let mut ws = WorkspaceBuilder::new(types)
//!     .sink(OutputSink::new(writer.clone()))
//!     .build()?;
//! let mut obs = OutputObserver::new(writer);
//! ws.exec_agents_observed(ContextId::ALL, &mut obs)?;
//! obs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod sink;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::OutputObserver;
pub use row::{AgentStateRow, StaticChangeRow, TickSummaryRow};
pub use sink::OutputSink;
pub use writer::{OutputWriter, SharedWriter, shared};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
