//! `bt-context`: the runtime execution context of the behavior-tree engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`registry`]  | `AgentRegistry`: id index, priority buckets, named bindings, delay queues |
//! | [`scheduler`] | `Context::exec_agents`, `TickReport`                        |
//! | [`statics`]   | `StaticTracker`: live static variables and logged baselines |
//! | [`log`]       | `LogSink` trait, `TracingSink`, `LogError`                  |
//! | [`persist`]   | `States` snapshot, `Context::save` / `Context::load`        |
//! | [`context`]   | `Context` itself and its `TaskContext` implementation       |
//! | [`error`]     | `ContextError`, `ContextResult<T>`                          |
//!
//! # Tick model
//!
//! ```text
//! exec_agents():
//!   ① guard      a context that is already executing refuses to nest
//!   ② walk       priority buckets ascending, members by ascending AgentId;
//!                each live agent runs its behavior-tree task once
//!                (add/remove requests from tasks go to the delay queues)
//!   ③ drain      pending additions (FIFO), then pending removals (FIFO)
//!   ④ prune      entries whose agent was dropped by its owner are removed
//!   ⑤ clock      frame += 1, elapsed += step
//! ```
//!
//! Everything is single-threaded: a context is `!Send` because it observes
//! `Rc`-owned agents, and mutual exclusion during a tick comes from the
//! delay queues rather than locks.

pub mod context;
pub mod error;
pub mod log;
pub mod persist;
pub mod registry;
pub mod scheduler;
pub mod statics;


pub use context::Context;
pub use error::{ContextError, ContextResult};
pub use log::{LogError, LogResult, LogSink, TracingSink};
pub use persist::{AgentSnapshot, NamedBinding, States};
pub use registry::AgentRegistry;
pub use scheduler::TickReport;
pub use statics::StaticTracker;
