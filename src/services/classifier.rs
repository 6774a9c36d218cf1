//! Deterministic rule-based classifier.
//!
//! The fallback tier of the two-tier classification protocol, and the
//! canonical decision logic when no external reasoning service is
//! configured. Pure, synchronous, always succeeds. Rules are keyed on the
//! event type; numeric thresholds are inclusive (`>=`) and evaluated in
//! listed order, first match wins.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Event, Severity, ToolCall, TriageOutput};
use crate::domain::ports::Classifier;

/// The rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify an event. Severity and category are always present;
    /// unmatched events get the S4/Unknown no-action decision.
    pub fn evaluate(&self, event: &Event) -> TriageOutput {
        match event.event_type.as_str() {
            "machine_overheat" | "machine_upset" => machine_rules(event),
            "order_delay" => order_rules(event),
            "ppe_missing" | "unsafe_zone_entry" | "ppe_violation" => TriageOutput {
                severity: Severity::S1,
                category: "Safety".to_string(),
                rationale: format!("safety violation: {}", event.event_type),
                tools_to_call: vec![notify("supervisor", "Safety violation detected", "critical")],
            },
            _ => TriageOutput::no_issue(),
        }
    }
}

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify(&self, event: &Event) -> DomainResult<TriageOutput> {
        Ok(self.evaluate(event))
    }
}

fn machine_rules(event: &Event) -> TriageOutput {
    let temp = event.payload_f64("temperature").unwrap_or(0.0);
    let vibration = event.payload_f64("vibration").unwrap_or(0.0);
    let machine_id = event
        .payload_str("id")
        .or_else(|| event.payload_str("machine_id"))
        .unwrap_or_default()
        .to_string();

    if temp >= 120.0 {
        TriageOutput {
            severity: Severity::S1,
            category: "Machine".to_string(),
            rationale: format!("temperature {temp}C at or above 120C"),
            tools_to_call: vec![
                ToolCall::new("stop_machine", args(json!({"machine_id": machine_id}))),
                ToolCall::new("schedule_maintenance", args(json!({"machine_id": machine_id}))),
                notify("supervisor", "Machine overheat detected", "critical"),
            ],
        }
    } else if temp >= 100.0 || vibration >= 1.2 {
        TriageOutput {
            severity: Severity::S2,
            category: "Machine".to_string(),
            rationale: format!("upset: temperature {temp}C or vibration {vibration}"),
            tools_to_call: vec![notify("maintenance", "High temp", "warning")],
        }
    } else {
        TriageOutput::no_issue()
    }
}

fn order_rules(event: &Event) -> TriageOutput {
    let delay = event.payload_f64("delay_percent").unwrap_or(0.0);
    let order_id = event.payload_str("order_id").unwrap_or_default().to_string();

    if delay >= 50.0 {
        TriageOutput {
            severity: Severity::S2,
            category: "Order".to_string(),
            rationale: format!("delay {delay}%"),
            tools_to_call: vec![
                ToolCall::new(
                    "update_order",
                    args(json!({"order_id": order_id, "new_due_in_hours": 3})),
                ),
                notify("planner", "Order heavily delayed", "warning"),
            ],
        }
    } else if delay >= 20.0 {
        TriageOutput {
            severity: Severity::S3,
            category: "Order".to_string(),
            rationale: format!("moderate delay {delay}%"),
            tools_to_call: vec![notify("planner", "Order delayed", "info")],
        }
    } else {
        TriageOutput::no_issue()
    }
}

fn notify(role: &str, message: &str, level: &str) -> ToolCall {
    ToolCall::new("notify", args(json!({"role": role, "message": message, "level": level})))
}

fn args(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, payload: Value) -> Event {
        Event::from_value(json!({"source": "Test", "type": event_type, "payload": payload}))
            .unwrap()
    }

    #[test]
    fn overheat_at_120_is_critical_with_three_calls_in_order() {
        let out = RuleClassifier.evaluate(&event(
            "machine_overheat",
            json!({"id": "M-7", "temperature": 120.0}),
        ));
        assert_eq!(out.severity, Severity::S1);
        assert_eq!(out.category, "Machine");
        let names: Vec<_> = out.tools_to_call.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["stop_machine", "schedule_maintenance", "notify"]);
        assert_eq!(out.tools_to_call[0].args["machine_id"], json!("M-7"));
        assert_eq!(out.tools_to_call[2].args["level"], json!("critical"));
    }

    #[test]
    fn machine_upset_shares_the_overheat_rules() {
        let out = RuleClassifier.evaluate(&event(
            "machine_upset",
            json!({"machine_id": "M-2", "temperature": 130.0}),
        ));
        assert_eq!(out.severity, Severity::S1);
        assert_eq!(out.tools_to_call[0].args["machine_id"], json!("M-2"));
    }

    #[test]
    fn warm_or_vibrating_machine_is_a_warning() {
        let out = RuleClassifier
            .evaluate(&event("machine_upset", json!({"id": "M-1", "temperature": 100.0})));
        assert_eq!(out.severity, Severity::S2);
        assert_eq!(out.tools_to_call.len(), 1);
        assert_eq!(out.tools_to_call[0].args["role"], json!("maintenance"));

        let out = RuleClassifier
            .evaluate(&event("machine_upset", json!({"id": "M-1", "vibration": 1.2})));
        assert_eq!(out.severity, Severity::S2);
    }

    #[test]
    fn cool_machine_is_no_issue() {
        let out = RuleClassifier.evaluate(&event(
            "machine_overheat",
            json!({"id": "M-1", "temperature": 99.9, "vibration": 1.19}),
        ));
        assert_eq!(out.severity, Severity::S4);
        assert_eq!(out.category, "Unknown");
        assert!(out.tools_to_call.is_empty());
    }

    #[test]
    fn heavy_order_delay_reschedules_plus_three_hours() {
        let out = RuleClassifier.evaluate(&event(
            "order_delay",
            json!({"order_id": "O-9", "delay_percent": 50.0}),
        ));
        assert_eq!(out.severity, Severity::S2);
        assert_eq!(out.category, "Order");
        assert_eq!(out.tools_to_call[0].name, "update_order");
        assert_eq!(out.tools_to_call[0].args["new_due_in_hours"], json!(3));
        assert_eq!(out.tools_to_call[1].args["level"], json!("warning"));
    }

    #[test]
    fn moderate_order_delay_notifies_planner_only() {
        for dp in [20.0, 35.0, 49.9] {
            let out = RuleClassifier
                .evaluate(&event("order_delay", json!({"order_id": "O-9", "delay_percent": dp})));
            assert_eq!(out.severity, Severity::S3);
            assert_eq!(out.tools_to_call.len(), 1);
            assert_eq!(out.tools_to_call[0].name, "notify");
            assert_eq!(out.tools_to_call[0].args["level"], json!("info"));
        }
    }

    #[test]
    fn small_order_delay_is_no_issue() {
        let out = RuleClassifier
            .evaluate(&event("order_delay", json!({"order_id": "O-9", "delay_percent": 19.9})));
        assert_eq!(out.severity, Severity::S4);
    }

    #[test]
    fn safety_violations_are_always_critical() {
        for t in ["ppe_missing", "unsafe_zone_entry", "ppe_violation"] {
            let out = RuleClassifier.evaluate(&event(t, json!({"id": "SL-1"})));
            assert_eq!(out.severity, Severity::S1);
            assert_eq!(out.category, "Safety");
            assert_eq!(out.tools_to_call.len(), 1);
            assert_eq!(out.tools_to_call[0].args["level"], json!("critical"));
        }
    }

    #[test]
    fn unknown_type_is_no_issue() {
        let out = RuleClassifier.evaluate(&event("coffee_spill", json!({})));
        assert_eq!(out.severity, Severity::S4);
        assert_eq!(out.category, "Unknown");
        assert_eq!(out.rationale, "no issue");
        assert!(out.tools_to_call.is_empty());
    }
}
