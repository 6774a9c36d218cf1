//! Tool dispatcher: a closed registry of side-effecting handlers.
//!
//! Dispatch is an explicit `match` on the tool name — no dynamic lookup.
//! Each handler writes exactly one action log entry describing its effect
//! and reports its outcome inline; a failing call never aborts the calls
//! after it, and an unknown name produces no write at all.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::models::ToolCall;
use crate::domain::ports::ActionLogStore;

/// Outcome of one tool invocation, reported inline in dispatch results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    Ok { status: String, message: String },
    Error { error: String, tool: String },
}

impl ToolOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self::Ok {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn unknown_tool(name: &str) -> Self {
        Self::Error {
            error: "unknown_tool".to_string(),
            tool: name.to_string(),
        }
    }

    fn failed(name: &str, error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            tool: name.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// One executed call paired with its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub call: ToolCall,
    pub result: ToolOutcome,
}

/// Executes tool calls against the fixed registry, recording effects in
/// the action log.
#[derive(Clone)]
pub struct ToolDispatcher {
    log: Arc<dyn ActionLogStore>,
}

impl ToolDispatcher {
    pub fn new(log: Arc<dyn ActionLogStore>) -> Self {
        Self { log }
    }

    /// Execute calls sequentially in the order given by the classifier.
    /// A failure in one call does not prevent subsequent calls.
    pub fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<DispatchResult> {
        calls
            .iter()
            .map(|call| DispatchResult {
                call: call.clone(),
                result: self.dispatch(call),
            })
            .collect()
    }

    /// Execute one call. Argument shape is taken as-is; missing required
    /// keys are handler-level failures, not dispatcher-level ones.
    pub fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        match call.name.as_str() {
            "stop_machine" => self.stop_machine(&call.args),
            "schedule_maintenance" => self.schedule_maintenance(&call.args),
            "update_order" => self.update_order(&call.args),
            "notify" => self.notify_args(&call.args),
            "log" => self.log_event(&call.args),
            unknown => ToolOutcome::unknown_tool(unknown),
        }
    }

    /// Convenience for the supervisor's direct notifications.
    pub fn notify(&self, role: &str, message: &str, level: &str) -> ToolOutcome {
        self.notify_args(&fields(json!({"role": role, "message": message, "level": level})))
    }

    /// Convenience for the supervisor's direct reschedules.
    pub fn reschedule_order(&self, order_id: &str, new_due_in_hours: f64) -> ToolOutcome {
        self.update_order(&fields(
            json!({"order_id": order_id, "new_due_in_hours": new_due_in_hours}),
        ))
    }

    fn stop_machine(&self, args: &Map<String, Value>) -> ToolOutcome {
        let Some(machine_id) = str_arg(args, "machine_id") else {
            return ToolOutcome::failed("stop_machine", "missing required argument: machine_id");
        };
        self.write(
            "stop_machine",
            fields(json!({"actor": "tool", "action": "stop_machine", "target": machine_id})),
            format!("Machine {machine_id} stopped."),
        )
    }

    fn schedule_maintenance(&self, args: &Map<String, Value>) -> ToolOutcome {
        let Some(machine_id) = str_arg(args, "machine_id") else {
            return ToolOutcome::failed(
                "schedule_maintenance",
                "missing required argument: machine_id",
            );
        };
        let eta_hours = args.get("eta_hours").cloned().unwrap_or(json!(1));
        self.write(
            "schedule_maintenance",
            fields(json!({
                "actor": "tool",
                "action": "schedule_maintenance",
                "target": machine_id,
                "eta_hours": eta_hours
            })),
            format!("Maintenance scheduled for {machine_id}."),
        )
    }

    fn update_order(&self, args: &Map<String, Value>) -> ToolOutcome {
        let Some(order_id) = str_arg(args, "order_id") else {
            return ToolOutcome::failed("update_order", "missing required argument: order_id");
        };
        let Some(new_due) = args.get("new_due_in_hours") else {
            return ToolOutcome::failed(
                "update_order",
                "missing required argument: new_due_in_hours",
            );
        };
        self.write(
            "update_order",
            fields(json!({
                "actor": "tool",
                "action": "update_order",
                "target": order_id,
                "new_due_in_hours": new_due
            })),
            format!("Order {order_id} rescheduled."),
        )
    }

    fn notify_args(&self, args: &Map<String, Value>) -> ToolOutcome {
        let Some(role) = str_arg(args, "role") else {
            return ToolOutcome::failed("notify", "missing required argument: role");
        };
        let Some(message) = str_arg(args, "message") else {
            return ToolOutcome::failed("notify", "missing required argument: message");
        };
        let level = str_arg(args, "level").unwrap_or_else(|| "info".to_string());
        self.write(
            "notify",
            fields(json!({
                "actor": "tool",
                "action": "notify",
                "target": role,
                "message": message,
                "level": level
            })),
            "notification logged",
        )
    }

    fn log_event(&self, args: &Map<String, Value>) -> ToolOutcome {
        let Some(event) = args.get("event") else {
            return ToolOutcome::failed("log", "missing required argument: event");
        };
        self.write(
            "log",
            fields(json!({"actor": "tool", "action": "log", "event": event})),
            "event logged",
        )
    }

    fn write(
        &self,
        tool: &str,
        entry: Map<String, Value>,
        message: impl Into<String>,
    ) -> ToolOutcome {
        match self.log.append(entry) {
            Ok(_) => ToolOutcome::ok(message),
            Err(e) => ToolOutcome::failed(tool, e.to_string()),
        }
    }
}

fn str_arg(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}

fn fields(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json::JsonActionLog;
    use tempfile::TempDir;

    fn dispatcher(dir: &TempDir) -> (ToolDispatcher, Arc<JsonActionLog>) {
        let log = Arc::new(JsonActionLog::new(dir.path().join("action_log.json")));
        (ToolDispatcher::new(log.clone()), log)
    }

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall::new(name, args.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn unknown_tool_reports_error_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, log) = dispatcher(&dir);

        let outcome = dispatcher.dispatch(&call("launch_rocket", json!({})));
        assert_eq!(
            outcome,
            ToolOutcome::Error {
                error: "unknown_tool".to_string(),
                tool: "launch_rocket".to_string()
            }
        );
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn stop_machine_records_its_effect() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, log) = dispatcher(&dir);

        let outcome = dispatcher.dispatch(&call("stop_machine", json!({"machine_id": "M-3"})));
        assert!(outcome.is_ok());

        let entries = log.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action(), Some("stop_machine"));
        assert_eq!(entries[0].fields["target"], json!("M-3"));
    }

    #[test]
    fn missing_required_argument_is_a_handler_failure() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, log) = dispatcher(&dir);

        let outcome = dispatcher.dispatch(&call("update_order", json!({"order_id": "O-1"})));
        assert!(matches!(outcome, ToolOutcome::Error { ref error, .. }
            if error.contains("new_due_in_hours")));
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn notify_defaults_level_to_info() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, log) = dispatcher(&dir);

        dispatcher.dispatch(&call("notify", json!({"role": "planner", "message": "hello"})));
        assert_eq!(log.read_all()[0].level(), Some("info"));
    }

    #[test]
    fn one_failure_does_not_stop_subsequent_calls() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, log) = dispatcher(&dir);

        let results = dispatcher.dispatch_all(&[
            call("stop_machine", json!({})), // missing machine_id
            call("notify", json!({"role": "supervisor", "message": "after failure"})),
        ]);

        assert!(!results[0].result.is_ok());
        assert!(results[1].result.is_ok());
        assert_eq!(log.read_all().len(), 1);
    }

    #[test]
    fn outcome_wire_shapes() {
        let ok = serde_json::to_value(ToolOutcome::ok("done")).unwrap();
        assert_eq!(ok, json!({"status": "ok", "message": "done"}));
        let err = serde_json::to_value(ToolOutcome::unknown_tool("x")).unwrap();
        assert_eq!(err, json!({"error": "unknown_tool", "tool": "x"}));
    }
}
