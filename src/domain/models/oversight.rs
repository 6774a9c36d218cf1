//! Durable supervisor state.

use serde::{Deserialize, Serialize};

/// Persisted between supervisor ticks and across restarts, purely to
/// deduplicate the once-per-day digest within a UTC calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorState {
    /// ISO date (`YYYY-MM-DD`) of the last emitted daily digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_daily_summary: Option<String>,
}

impl SupervisorState {
    /// Whether a digest was already emitted for the given UTC date.
    pub fn digested_on(&self, date: &str) -> bool {
        self.last_daily_summary.as_deref() == Some(date)
    }
}
