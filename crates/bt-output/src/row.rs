//! Plain data row types written by output backends.

use bt_agent::Agent;
use bt_context::TickReport;
use bt_core::{ContextId, Value, VarChange};

/// Summary of one context tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub context_id: i64,
    pub frame:      u64,
    pub executed:   u64,
    pub success:    u64,
    pub failure:    u64,
    pub running:    u64,
    pub added:      u64,
    pub removed:    u64,
    pub stale:      u64,
}

impl TickSummaryRow {
    pub fn from_report(context: ContextId, report: &TickReport) -> Self {
        Self {
            context_id: context.0,
            frame:      report.frame,
            executed:   report.executed as u64,
            success:    report.success as u64,
            failure:    report.failure as u64,
            running:    report.running as u64,
            added:      report.added as u64,
            removed:    report.removed as u64,
            stale:      report.stale as u64,
        }
    }
}

/// One changed static variable.  `old`/`new` are empty when the variable
/// was added/removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticChangeRow {
    pub context_id: i64,
    pub frame:      u64,
    pub class:      String,
    pub name:       String,
    pub old:        String,
    pub new:        String,
}

impl StaticChangeRow {
    pub fn from_change(context: ContextId, frame: u64, class: &str, change: &VarChange) -> Self {
        Self {
            context_id: context.0,
            frame,
            class:      class.to_owned(),
            name:       change.name.clone(),
            old:        change.old.as_ref().map(value_text).unwrap_or_default(),
            new:        change.new.as_ref().map(value_text).unwrap_or_default(),
        }
    }
}

/// One agent's state diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStateRow {
    pub context_id: i64,
    pub frame:      u64,
    pub agent_id:   u32,
    pub class:      String,
    pub name:       String,
    pub state:      String,
}

impl AgentStateRow {
    pub fn from_agent(context: ContextId, frame: u64, agent: &Agent, state: &str) -> Self {
        Self {
            context_id: context.0,
            frame,
            agent_id:   agent.id().0,
            class:      agent.class_name().to_owned(),
            name:       agent.name().to_owned(),
            state:      state.to_owned(),
        }
    }
}

/// Cell text for a value: strings unquoted, everything else as displayed.
fn value_text(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}
