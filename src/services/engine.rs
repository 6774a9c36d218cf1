//! The triage engine: single consumer of the event queue.
//!
//! Each dequeued event runs the full pipeline sequentially — classify,
//! dispatch, update memory, safety resolution, broadcast — before the
//! next event is taken, so there is never more than one triage in flight
//! and side effects interleave in a single total order. A failing event
//! is logged with its payload and skipped; the loop never stalls.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Event, MemoryState, TriageOutput, TriageRecord};
use crate::domain::ports::{ActionLogStore, Classifier, SafetyRegister};
use crate::services::classifier::RuleClassifier;
use crate::services::dispatcher::ToolDispatcher;
use crate::services::fanout::Fanout;
use crate::services::queue::EventQueue;

/// Event-processing core with injected dependencies. Construct once at
/// process start and share by handle; producers and the transport layer
/// only ever call [`publish`](Self::publish) /
/// [`process_one`](Self::process_one) / [`snapshot_memory`](Self::snapshot_memory).
pub struct TriageEngine {
    queue: EventQueue,
    primary: Option<Arc<dyn Classifier>>,
    rules: RuleClassifier,
    dispatcher: ToolDispatcher,
    action_log: Arc<dyn ActionLogStore>,
    safety: Arc<dyn SafetyRegister>,
    fanout: Fanout,
    memory: RwLock<MemoryState>,
}

impl TriageEngine {
    pub fn new(
        dispatcher: ToolDispatcher,
        action_log: Arc<dyn ActionLogStore>,
        safety: Arc<dyn SafetyRegister>,
        fanout: Fanout,
    ) -> Self {
        Self {
            queue: EventQueue::new(),
            primary: None,
            rules: RuleClassifier::new(),
            dispatcher,
            action_log,
            safety,
            fanout,
            memory: RwLock::new(MemoryState::default()),
        }
    }

    /// Attach a primary-path classifier. Without one, the deterministic
    /// rule table is the canonical decision logic.
    pub fn with_primary_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.primary = Some(classifier);
        self
    }

    /// Observer fanout handle for subscriptions.
    pub fn fanout(&self) -> &Fanout {
        &self.fanout
    }

    /// Enqueue an event; never blocks waiting for processing.
    pub fn publish(&self, event: Event) {
        self.queue.publish(event);
    }

    /// Validate untyped JSON and enqueue it. Malformed input is reported,
    /// logged with the offending payload, and dropped — never retried.
    pub fn publish_value(&self, value: Value) -> DomainResult<()> {
        match Event::from_value(value.clone()) {
            Ok(event) => {
                self.publish(event);
                Ok(())
            }
            Err(e) => {
                self.action_log.record(entry(json!({
                    "actor": "TriageEngine",
                    "error": e.to_string(),
                    "event": value
                })));
                Err(e)
            }
        }
    }

    /// Read-only point-in-time copy of the aggregate memory.
    pub async fn snapshot_memory(&self) -> MemoryState {
        self.memory.read().await.clone()
    }

    /// Run the identical pipeline as the queued path, synchronously.
    /// Used for request/response submission.
    pub async fn process_one(&self, event: Event) -> DomainResult<TriageRecord> {
        // Classify; the decision is logged even when the fallback fired.
        let triage = self.triage(&event).await;
        self.action_log.record(entry(json!({
            "agent": "TriageEngine",
            "event": event,
            "triage": triage
        })));

        // Dispatch every call in classifier order; failures stay inline.
        let executed = self.dispatcher.dispatch_all(&triage.tools_to_call);
        self.action_log.record(entry(json!({
            "agent": "TriageEngine",
            "executed": executed
        })));

        // Aggregate the severity and category exactly as returned.
        self.memory.write().await.record(&triage);

        self.resolve_safety(&event);

        let record = TriageRecord {
            id: Uuid::new_v4(),
            event,
            triage,
            executed,
        };
        self.fanout.triage(record.clone());
        Ok(record)
    }

    /// Consume the queue until every publisher handle is gone. A single
    /// bad event can never halt the loop.
    pub async fn run_loop(&self) {
        while let Some(event) = self.queue.dequeue().await {
            if let Err(e) = self.process_one(event.clone()).await {
                self.action_log.record(entry(json!({
                    "actor": "TriageEngine",
                    "error": e.to_string(),
                    "event": event
                })));
            }
        }
        tracing::info!("event queue closed, consumer loop exiting");
    }

    /// Two-tier classification. A primary-path failure is recovered via
    /// the rule table and recorded distinctly from a normal triage entry,
    /// with the causing error and the fallback decision.
    async fn triage(&self, event: &Event) -> TriageOutput {
        let Some(primary) = &self.primary else {
            return self.rules.evaluate(event);
        };
        match primary.classify(event).await {
            Ok(triage) => triage,
            Err(e) => {
                let fallback = self.rules.evaluate(event);
                self.action_log.record(entry(json!({
                    "agent": "TriageEngine",
                    "fallback_used": true,
                    "error": e.to_string(),
                    "event": event,
                    "fallback": fallback
                })));
                fallback
            }
        }
    }

    /// Resolve the related safety incident after processing, when the
    /// event identifies one. Never raises: resolution errors are swallowed
    /// and traced, and a no-op resolution is silent.
    fn resolve_safety(&self, event: &Event) {
        let from_safety_agent = event.source == "SafetyAgent" && event.safety_id().is_some();
        let explicit_resolve = event.event_type == "safety_resolve" && event.safety_id().is_some();
        if !from_safety_agent && !explicit_resolve {
            return;
        }
        let Some(id) = event.safety_id().map(ToString::to_string) else {
            return;
        };
        match self.safety.mark_resolved(&id) {
            Ok(true) => {
                self.action_log.record(entry(json!({
                    "agent": "TriageEngine",
                    "action": "safety_resolved",
                    "log_id": id
                })));
                self.fanout.safety_resolved(id);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(id, "safety resolution failed: {e}");
            }
        }
    }
}

fn entry(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json::{JsonActionLog, JsonSafetyRegister};
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> TriageEngine {
        let log = Arc::new(JsonActionLog::new(dir.path().join("action_log.json")));
        let safety = Arc::new(JsonSafetyRegister::new(dir.path().join("safety_logs.json")));
        TriageEngine::new(
            ToolDispatcher::new(log.clone()),
            log,
            safety,
            Fanout::new(16),
        )
    }

    #[tokio::test]
    async fn malformed_input_is_logged_and_dropped() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);

        let err = engine.publish_value(json!({"payload": {}})).unwrap_err();
        assert!(matches!(err, DomainError::MalformedEvent(_)));

        let entries = engine.action_log.read_all();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].fields.contains_key("error"));
        assert_eq!(engine.snapshot_memory().await.events_processed, 0);
    }

    #[tokio::test]
    async fn valid_value_is_accepted_without_logging() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        engine
            .publish_value(json!({"source": "Test", "type": "noop"}))
            .unwrap();
        assert!(engine.action_log.read_all().is_empty());
    }
}
