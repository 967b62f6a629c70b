//! Static-variable tracking with diff-then-commit logging.
//!
//! Each context keeps two maps keyed by agent class:
//!
//! - **live**: the current static values, seeded from the class
//!   declarations in the `TypeRegistry` and mutated by tasks;
//! - **baseline**: the values as of the last successful log.
//!
//! Logging diffs `baseline → live`, hands the changes to the sink, and only
//! when the sink accepts them overwrites the baseline with the live values.
//! A second log with no intervening change therefore emits nothing, and a
//! sink failure loses no diff.

use std::collections::{BTreeMap, BTreeSet};

use bt_agent::{AgentError, AgentResult, TypeRegistry};
use bt_core::{ContextId, Value, VarChange, Variables};

use crate::{LogResult, LogSink};

/// Live static variables and their last-logged baselines.
#[derive(Clone, Debug, Default)]
pub struct StaticTracker {
    live:      BTreeMap<String, Variables>,
    baselines: BTreeMap<String, Variables>,
}

impl StaticTracker {
    /// Seed live values from every class's declared defaults.  Baselines
    /// start empty, so the first log reports every declared variable.
    pub fn seeded(types: &TypeRegistry) -> Self {
        let live = types
            .all_static_defaults()
            .into_iter()
            .map(|(class, vars)| (class.to_owned(), vars.clone()))
            .collect();
        Self { live, baselines: BTreeMap::new() }
    }

    pub fn get(&self, class: &str, name: &str) -> Option<&Value> {
        self.live.get(class)?.get(name)
    }

    /// Set a live static variable of a registered class.  Non-finite floats
    /// are refused so every snapshot stays JSON-encodable.
    pub fn set(
        &mut self,
        types: &TypeRegistry,
        class: &str,
        name:  &str,
        value: Value,
    ) -> AgentResult<()> {
        if !types.contains_class(class) {
            return Err(AgentError::UnknownClass(class.to_owned()));
        }
        if !value.is_finite() {
            return Err(AgentError::NonFiniteValue { class: class.to_owned(), name: name.to_owned() });
        }
        self.live.entry(class.to_owned()).or_default().set(name, value);
        Ok(())
    }

    pub fn live(&self, class: &str) -> Option<&Variables> {
        self.live.get(class)
    }

    pub fn baseline(&self, class: &str) -> Option<&Variables> {
        self.baselines.get(class)
    }

    pub fn baselines(&self) -> &BTreeMap<String, Variables> {
        &self.baselines
    }

    pub fn live_values(&self) -> &BTreeMap<String, Variables> {
        &self.live
    }

    /// Changes a log of `class` would emit, without committing anything.
    pub fn pending_changes(&self, class: &str) -> Vec<VarChange> {
        let empty = Variables::new();
        let baseline = self.baselines.get(class).unwrap_or(&empty);
        let live = self.live.get(class).unwrap_or(&empty);
        baseline.diff(live)
    }

    /// Diff, emit, then commit for one class or (with `None`) every class
    /// that has live values or a baseline.
    ///
    /// Returns the number of changed fields emitted.  On a sink error the
    /// failing class keeps its old baseline; classes logged before it in this
    /// call stay committed.
    pub fn log(
        &mut self,
        context: ContextId,
        frame:   u64,
        class:   Option<&str>,
        sink:    &mut dyn LogSink,
    ) -> LogResult<usize> {
        let classes: Vec<String> = match class {
            Some(c) => vec![c.to_owned()],
            None => self
                .live
                .keys()
                .chain(self.baselines.keys())
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let mut emitted = 0;
        for class in classes {
            let changes = self.pending_changes(&class);
            if changes.is_empty() {
                continue;
            }
            sink.log_static_changes(context, frame, &class, &changes)?;
            emitted += changes.len();
            match self.live.get(&class) {
                Some(live) => {
                    self.baselines.insert(class, live.clone());
                }
                None => {
                    self.baselines.remove(&class);
                }
            }
        }
        Ok(emitted)
    }

    /// Forget every baseline; the next log reports all live values again.
    pub fn clear_baselines(&mut self) {
        self.baselines.clear();
    }

    pub(crate) fn replace(
        &mut self,
        baselines: BTreeMap<String, Variables>,
        live:      BTreeMap<String, Variables>,
    ) {
        self.baselines = baselines;
        self.live = live;
    }
}
