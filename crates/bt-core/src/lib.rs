//! `bt-core`: foundational types for the `rust_bt` behavior-tree runtime.
//!
//! This crate is a dependency of every other `bt-*` crate.  It has no `bt-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`/`serde_json`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `ContextId`                                    |
//! | [`time`]   | `ContextClock` (frames and elapsed time since creation)   |
//! | [`vars`]   | `Value`, `Variables`, `VarChange`                         |
//! | [`config`] | `WorkspaceConfig`                                         |
//! | [`error`]  | `BtError`, `BtResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types, plus        |
//! |         | `WorkspaceConfig::from_json_str`.  Required by bt-context. |

pub mod config;
pub mod error;
pub mod ids;
pub mod time;
pub mod vars;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::WorkspaceConfig;
pub use error::{BtError, BtResult};
pub use ids::{AgentId, ContextId};
pub use time::ContextClock;
pub use vars::{Value, VarChange, Variables};
