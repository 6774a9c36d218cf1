//! Safety register domain model.
//!
//! Safety incidents have a one-way status transition: once `resolved`,
//! further resolution attempts are no-ops.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status of a safety incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyStatus {
    Unresolved,
    Resolved,
}

impl Default for SafetyStatus {
    fn default() -> Self {
        Self::Unresolved
    }
}

impl SafetyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Resolved => "resolved",
        }
    }
}

/// A durable safety incident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyLogEntry {
    pub id: String,
    pub event_type: String,
    #[serde(default)]
    pub status: SafetyStatus,
    /// Site-specific detail fields carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SafetyLogEntry {
    pub fn is_unresolved(&self) -> bool {
        self.status == SafetyStatus::Unresolved
    }
}
