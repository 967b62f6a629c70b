//! Fluent builder for constructing a [`Workspace`].

use std::rc::Rc;

use bt_agent::TypeRegistry;
use bt_context::{LogSink, TracingSink};
use bt_core::WorkspaceConfig;

use crate::{Workspace, WorkspaceResult};

/// Fluent builder for [`Workspace`].
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                     |
/// |---------------|-----------------------------|
/// | `.config(c)`  | `WorkspaceConfig::default()` |
/// | `.sink(s)`    | `TracingSink`               |
///
/// # Example
///
/// ```rust,ignore
/// let mut ws = WorkspaceBuilder::new(types)
///     .config(WorkspaceConfig::from_json_str(&json)?)
///     .sink(OutputSink::new(writer.clone()))
///     .build()?;
/// ```
pub struct WorkspaceBuilder {
    types:  Rc<TypeRegistry>,
    config: WorkspaceConfig,
    sink:   Option<Box<dyn LogSink>>,
}

impl WorkspaceBuilder {
    /// Start a builder around the type registry every context will share.
    pub fn new(types: impl Into<Rc<TypeRegistry>>) -> Self {
        Self {
            types:  types.into(),
            config: WorkspaceConfig::default(),
            sink:   None,
        }
    }

    pub fn config(mut self, config: WorkspaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Destination for static-variable diffs and agent state lines logged by
    /// the workspace.
    pub fn sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validate the configuration and return an empty workspace.
    pub fn build(self) -> WorkspaceResult<Workspace> {
        self.config.validate()?;
        Ok(Workspace::new(
            self.config,
            self.types,
            self.sink.unwrap_or_else(|| Box::new(TracingSink)),
        ))
    }
}
