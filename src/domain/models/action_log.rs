//! Action log domain model.
//!
//! Every tool invocation and diagnostic event is recorded as an
//! [`ActionLogEntry`]: arbitrary structured fields plus a UTC timestamp
//! assigned at write time. The durable file is a newest-first JSON array.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry in the action log. Fields are free-form so that tool
/// handlers, the engine, and the supervisor can each record their own
/// shape; accessors below cover the fields window queries care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLogEntry {
    pub fields: Map<String, Value>,
}

impl ActionLogEntry {
    /// Build an entry from free-form fields, stamping `timestamp` with the
    /// current UTC instant. Called by the store at write time.
    pub fn stamped(mut fields: Map<String, Value>) -> Self {
        fields.insert("timestamp".to_string(), Value::String(Utc::now().to_rfc3339()));
        Self { fields }
    }

    /// Parse the entry timestamp leniently: RFC 3339 first, then naive
    /// ISO 8601 treated as UTC. Returns `None` for missing or unparseable
    /// values; window queries discard such entries.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.fields.get("timestamp")?.as_str()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// The acting component (`tool`, `system`, ...), when recorded.
    pub fn actor(&self) -> Option<&str> {
        self.str_field("actor")
    }

    /// The tool action name (`notify`, `stop_machine`, ...), when recorded.
    pub fn action(&self) -> Option<&str> {
        self.str_field("action")
    }

    /// Notification level (`info`, `warning`, `critical`), when recorded.
    pub fn level(&self) -> Option<&str> {
        self.str_field("level")
    }

    /// The embedded event object, for producer and triage entries.
    pub fn event(&self) -> Option<&Value> {
        self.fields.get("event")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(fields: Value) -> ActionLogEntry {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn stamped_assigns_current_utc_timestamp() {
        let before = Utc::now();
        let e = ActionLogEntry::stamped(Map::new());
        let ts = e.timestamp().unwrap();
        assert!(ts >= before && ts <= Utc::now());
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        let e = entry(json!({"timestamp": "2026-08-29T10:00:00+00:00"}));
        assert!(e.timestamp().is_some());
    }

    #[test]
    fn naive_timestamp_is_treated_as_utc() {
        let e = entry(json!({"timestamp": "2026-08-29T10:00:00.123456"}));
        let ts = e.timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-08-29T10:00:00.123456+00:00");
    }

    #[test]
    fn unparseable_timestamp_yields_none() {
        assert_eq!(entry(json!({"timestamp": "yesterday"})).timestamp(), None);
        assert_eq!(entry(json!({"timestamp": 42})).timestamp(), None);
        assert_eq!(entry(json!({})).timestamp(), None);
    }

    #[test]
    fn accessors_read_flat_fields() {
        let e = entry(json!({"actor": "tool", "action": "notify", "level": "critical"}));
        assert_eq!(e.actor(), Some("tool"));
        assert_eq!(e.action(), Some("notify"));
        assert_eq!(e.level(), Some("critical"));
        assert!(e.event().is_none());
    }
}
