//! Event and triage domain models.
//!
//! An [`Event`] is a discrete operational occurrence submitted for triage.
//! Classification produces a [`TriageOutput`]: an ordinal severity, a
//! category, and an ordered list of remedial [`ToolCall`]s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// A discrete operational event (equipment anomaly, schedule slippage,
/// safety violation). Immutable once published; identity is positional.
/// Safety events carry an `id` inside the payload for correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Producer that emitted the event (e.g. `ShopFloorAgent`).
    pub source: String,
    /// Event type used by the fallback rule table (e.g. `machine_overheat`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Arbitrary structured payload.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl Event {
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            source: source.into(),
            event_type: event_type.into(),
            payload,
        }
    }

    /// Validate and coerce untyped JSON into the event shape.
    ///
    /// This is the malformed-input boundary: anything that fails here is
    /// dropped by the caller with a log entry, never retried.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        serde_json::from_value(value).map_err(|e| DomainError::MalformedEvent(e.to_string()))
    }

    /// String payload field lookup, `None` when absent or non-string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Numeric payload field lookup, `None` when absent or non-numeric.
    pub fn payload_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }

    /// Correlation id for safety resolution, if the event carries one.
    pub fn safety_id(&self) -> Option<&str> {
        self.payload_str("id")
    }
}

/// Ordinal urgency tag. `S1` is critical/immediate, `S4` means no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    S1,
    S2,
    S3,
    S4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::S4 => "S4",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "S1" => Some(Self::S1),
            "S2" => Some(Self::S2),
            "S3" => Some(Self::S3),
            "S4" => Some(Self::S4),
            _ => None,
        }
    }

    /// Whether the severity prescribes any remedial action at all.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::S4)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, parameterized request to perform one side-effecting action.
/// Produced only by a classifier result; `name` must match a registered
/// tool or dispatch yields an `unknown_tool` error without side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self { name: name.into(), args }
    }
}

/// Result of classifying one event. Severity and category are always
/// present, even on the fallback path; `tools_to_call` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutput {
    pub severity: Severity,
    pub category: String,
    pub rationale: String,
    #[serde(default)]
    pub tools_to_call: Vec<ToolCall>,
}

impl TriageOutput {
    /// The no-action decision used when no rule matches.
    pub fn no_issue() -> Self {
        Self {
            severity: Severity::S4,
            category: "Unknown".to_string(),
            rationale: "no issue".to_string(),
            tools_to_call: Vec::new(),
        }
    }
}

/// Composite result of running one event through the full pipeline:
/// the event, its triage decision, and the per-call dispatch results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRecord {
    /// Correlation id assigned when the record is produced.
    pub id: Uuid,
    pub event: Event,
    pub triage: TriageOutput,
    pub executed: Vec<crate::services::dispatcher::DispatchResult>,
}
