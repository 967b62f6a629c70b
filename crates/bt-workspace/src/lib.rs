//! `bt-workspace`: the context directory of the rust_bt runtime.
//!
//! A [`Workspace`] owns every [`Context`][bt_context::Context] of one
//! application, keyed by [`ContextId`][bt_core::ContextId].  It replaces a
//! process-wide static map with an explicit object passed by reference.
//!
//! # Directory operations
//!
//! | Operation                 | `id`                | `ContextId::ALL`             |
//! |---------------------------|---------------------|------------------------------|
//! | [`Workspace::context`]    | create-if-absent    | `InvalidContextId`           |
//! | [`Workspace::exec_agents`]| tick one context    | tick all, ascending id order |
//! | [`Workspace::cleanup`]    | release and remove  | release and remove all       |
//! | [`Workspace::log_current_states`] | one context | every context             |
//!
//! # Per-context tick as driven by the workspace
//!
//! ```text
//!   observer.on_tick_start(id, frame)
//!   context.exec_agents()                       walk, drain, prune, clock
//!   if config.log_static_variables_on_tick:     static diffs → sink
//!   if config.state_log_due(frame):             agent states + statics → sink
//!   observer.on_tick_end(id, &report)
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bt_agent::{Agent, NoopTask, TypeRegistryBuilder};
//! use bt_core::ContextId;
//! use bt_workspace::WorkspaceBuilder;
//!
//! let types = TypeRegistryBuilder::new().class("Npc").build()?;
//! let mut ws = WorkspaceBuilder::new(types).build()?;
//!
//! let npc = Agent::new("Npc", 0, NoopTask);
//! ws.context(ContextId(0))?.add_agent(&npc);
//! ws.exec_agents(ContextId::ALL)?;
//! ws.cleanup(ContextId::ALL)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod workspace;


pub use builder::WorkspaceBuilder;
pub use error::{WorkspaceError, WorkspaceResult};
pub use observer::{ExecObserver, NoopObserver};
pub use workspace::Workspace;
