//! `bt-agent`: agents, their behavior-tree tasks, and class registration.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`agent`]   | `Agent`, `AgentHandle` (externally owned, `Rc`-based)           |
//! | [`task`]    | `BehaviorTask` trait, `TaskStatus`, `TaskContext` seam trait    |
//! | [`noop`]    | `NoopTask`: placeholder that always succeeds                    |
//! | [`types`]   | `TypeRegistry` (class hierarchy, instance names, statics)       |
//! | [`builder`] | `TypeRegistryBuilder` (fluent, validated construction)          |
//! | [`error`]   | `AgentError`, `AgentResult<T>`                                  |
//!
//! # Ownership model
//!
//! Application code owns every agent through an [`AgentHandle`]
//! (`Rc<Agent>`).  Contexts only *observe* agents through `Weak<Agent>`, so
//! dropping a context never drops an agent, and dropping an agent simply
//! makes the context's entry stale.
//!
//! A task receives `&mut dyn TaskContext` during its tick.  The context
//! implementation (bt-context) defers structural changes requested through
//! it until the tick's walk has finished.

pub mod agent;
pub mod builder;
pub mod error;
pub mod noop;
pub mod task;
pub mod types;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentHandle};
pub use builder::TypeRegistryBuilder;
pub use error::{AgentError, AgentResult};
pub use noop::NoopTask;
pub use task::{BehaviorTask, StateBlob, TaskContext, TaskStatus};
pub use types::TypeRegistry;
