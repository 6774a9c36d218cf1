//! End-to-end pipeline tests: queue, classification, dispatch, memory,
//! safety resolution, and observer fanout working together against real
//! JSON file stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use floorwatch::adapters::json::{JsonActionLog, JsonSafetyRegister};
use floorwatch::domain::errors::{DomainError, DomainResult};
use floorwatch::domain::models::{Event, Severity, TriageOutput};
use floorwatch::domain::ports::{ActionLogStore, Classifier, SafetyRegister};
use floorwatch::services::{Fanout, Notice, ToolDispatcher, TriageEngine};

struct Fixture {
    _dir: TempDir,
    engine: TriageEngine,
    log: Arc<JsonActionLog>,
    safety: Arc<JsonSafetyRegister>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(JsonActionLog::new(dir.path().join("action_log.json")));
    let safety = Arc::new(JsonSafetyRegister::new(dir.path().join("safety_logs.json")));
    let engine = TriageEngine::new(
        ToolDispatcher::new(log.clone()),
        log.clone(),
        safety.clone(),
        Fanout::new(64),
    );
    Fixture {
        _dir: dir,
        engine,
        log,
        safety,
    }
}

fn seed_safety(f: &Fixture, entries: serde_json::Value) {
    std::fs::write(
        f._dir.path().join("safety_logs.json"),
        serde_json::to_vec_pretty(&entries).unwrap(),
    )
    .unwrap();
}

fn event(source: &str, event_type: &str, payload: serde_json::Value) -> Event {
    Event::from_value(json!({"source": source, "type": event_type, "payload": payload})).unwrap()
}

#[tokio::test]
async fn safety_event_runs_the_full_pipeline() {
    let f = fixture();
    seed_safety(
        &f,
        json!([{"id": "SL-1", "event_type": "ppe_missing", "status": "unresolved"}]),
    );
    let mut rx = f.engine.fanout().subscribe();

    let record = f
        .engine
        .process_one(event("SafetyAgent", "ppe_missing", json!({"id": "SL-1"})))
        .await
        .unwrap();

    assert_eq!(record.triage.severity, Severity::S1);
    assert_eq!(record.triage.category, "Safety");
    assert_eq!(record.executed.len(), 1);
    assert!(record.executed[0].result.is_ok());

    // The incident flipped to resolved on disk.
    let incidents = f.safety.load();
    assert!(!incidents[0].is_unresolved());

    // Resolution is broadcast before the completed record.
    match rx.recv().await.unwrap() {
        Notice::SafetyResolved { id } => assert_eq!(id, "SL-1"),
        other => panic!("expected safety_resolved first, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        Notice::Triage(broadcast) => assert_eq!(broadcast.id, record.id),
        other => panic!("expected triage record, got {other:?}"),
    }

    // The memory aggregate counted the decision.
    let memory = f.engine.snapshot_memory().await;
    assert_eq!(memory.events_processed, 1);
    assert_eq!(memory.counts_by_severity["S1"], 1);
    assert_eq!(memory.counts_by_category["Safety"], 1);

    // A resolution entry landed in the durable log.
    assert!(f
        .log
        .read_all()
        .iter()
        .any(|e| e.action() == Some("safety_resolved")));
}

#[tokio::test]
async fn explicit_resolve_event_works_from_any_source() {
    let f = fixture();
    seed_safety(
        &f,
        json!([{"id": "SL-7", "event_type": "unsafe_zone_entry", "status": "unresolved"}]),
    );

    f.engine
        .process_one(event("Operator", "safety_resolve", json!({"id": "SL-7"})))
        .await
        .unwrap();

    assert!(!f.safety.load()[0].is_unresolved());
}

#[tokio::test]
async fn resolving_an_already_resolved_incident_is_silent() {
    let f = fixture();
    seed_safety(
        &f,
        json!([{"id": "SL-3", "event_type": "ppe_missing", "status": "resolved"}]),
    );
    let mut rx = f.engine.fanout().subscribe();

    f.engine
        .process_one(event("SafetyAgent", "ppe_missing", json!({"id": "SL-3"})))
        .await
        .unwrap();

    // Only the triage record is broadcast; no resolution notice or entry.
    match rx.recv().await.unwrap() {
        Notice::Triage(_) => {}
        other => panic!("unexpected notice: {other:?}"),
    }
    assert!(!f
        .log
        .read_all()
        .iter()
        .any(|e| e.action() == Some("safety_resolved")));
}

struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _event: &Event) -> DomainResult<TriageOutput> {
        Err(DomainError::Classifier("provider unavailable".to_string()))
    }
}

#[tokio::test]
async fn classifier_failure_falls_back_to_rules() {
    let f = fixture();
    let engine = f.engine.with_primary_classifier(Arc::new(FailingClassifier));

    let record = engine
        .process_one(event(
            "ShopFloorAgent",
            "machine_overheat",
            json!({"id": "M-1", "temperature": 130.0}),
        ))
        .await
        .unwrap();

    // The rule table decided: critical machine event with the full
    // stop / maintain / notify sequence, all dispatched.
    assert_eq!(record.triage.severity, Severity::S1);
    assert_eq!(record.triage.category, "Machine");
    assert_eq!(record.executed.len(), 3);
    assert!(record.executed.iter().all(|r| r.result.is_ok()));

    // The fallback is recorded distinctly, with the causing error.
    let fallback_entry = f
        .log
        .read_all()
        .into_iter()
        .find(|e| e.fields.get("fallback_used") == Some(&json!(true)))
        .expect("fallback entry missing");
    assert!(fallback_entry.fields["error"]
        .as_str()
        .unwrap()
        .contains("provider unavailable"));
}

#[tokio::test]
async fn consumer_loop_drains_concurrent_publishers() {
    let f = fixture();
    let engine = Arc::new(f.engine);

    let consumer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run_loop().await })
    };

    let mut publishers = Vec::new();
    for task in 0..2 {
        let engine = Arc::clone(&engine);
        publishers.push(tokio::spawn(async move {
            for i in 0..10 {
                engine.publish(event("Test", "heartbeat", json!({"task": task, "seq": i})));
            }
        }));
    }
    for p in publishers {
        p.await.unwrap();
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let memory = engine.snapshot_memory().await;
        if memory.events_processed == 20 {
            // Unmatched event types all resolve to the no-action decision.
            assert_eq!(memory.counts_by_severity["S4"], 20);
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "consumer stalled at {} events",
            memory.events_processed
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    consumer.abort();
}

#[tokio::test]
async fn memory_aggregates_across_mixed_events() {
    let f = fixture();

    f.engine
        .process_one(event(
            "ShopFloorAgent",
            "machine_upset",
            json!({"id": "M-2", "temperature": 105.0}),
        ))
        .await
        .unwrap();
    f.engine
        .process_one(event(
            "OrderAgent",
            "order_delay",
            json!({"order_id": "O-9", "delay_percent": 60.0}),
        ))
        .await
        .unwrap();
    f.engine
        .process_one(event("Test", "mystery", json!({})))
        .await
        .unwrap();

    let memory = f.engine.snapshot_memory().await;
    assert_eq!(memory.events_processed, 3);
    assert_eq!(memory.counts_by_category["Machine"], 1);
    assert_eq!(memory.counts_by_category["Order"], 1);
    assert_eq!(memory.counts_by_category["Unknown"], 1);
    assert_eq!(memory.counts_by_severity["S2"], 2);
    assert_eq!(memory.last_triage.unwrap().category, "Unknown");
}
