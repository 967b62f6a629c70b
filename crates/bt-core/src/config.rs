//! Workspace-wide runtime configuration.

use crate::{BtError, BtResult};

/// Top-level runtime configuration shared by every context of a workspace.
///
/// Typically loaded from a JSON file by the application crate (see
/// [`WorkspaceConfig::from_json_str`]) and handed to the workspace builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkspaceConfig {
    /// Simulated milliseconds per tick, added to each context's clock after
    /// every completed tick.  `0` means the application drives time itself.
    pub tick_duration_millis: u32,

    /// Log every context's current state through the workspace log sink
    /// every N frames.  `0` disables periodic state logging.
    pub state_log_interval_ticks: u64,

    /// Log changed static variables after every tick, independent of
    /// `state_log_interval_ticks`.
    pub log_static_variables_on_tick: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            tick_duration_millis:         16,
            state_log_interval_ticks:     0,
            log_static_variables_on_tick: false,
        }
    }
}

impl WorkspaceConfig {
    /// Parse and validate a JSON document.  Missing fields take defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> BtResult<Self> {
        let config: WorkspaceConfig =
            serde_json::from_str(json).map_err(|e| BtError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the scheduler cannot honor.
    pub fn validate(&self) -> BtResult<()> {
        if self.tick_duration_millis > 3_600_000 {
            return Err(BtError::Config(format!(
                "tick_duration_millis {} exceeds one hour",
                self.tick_duration_millis
            )));
        }
        Ok(())
    }

    /// `true` if periodic state logging is due after `frame` completed ticks.
    #[inline]
    pub fn state_log_due(&self, frame: u64) -> bool {
        self.state_log_interval_ticks > 0 && frame.is_multiple_of(self.state_log_interval_ticks)
    }
}
