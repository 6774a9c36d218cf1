//! Periodic oversight of the action log.
//!
//! The supervisor reads the durable action log — not the event queue — on
//! its own timer. Each tick summarizes the trailing window, escalates
//! sustained critical activity, re-pushes delayed orders, and emits the
//! once-per-day digest. A tick failure is recorded and the loop continues;
//! the supervisor never terminates on error.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ActionLogEntry, SupervisorConfig, SupervisorState};
use crate::domain::ports::{ActionLogStore, StateStore};
use crate::services::dispatcher::ToolDispatcher;

/// Aggregate view over the trailing log window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub window_minutes: i64,
    pub total_actions: usize,
    pub by_action: BTreeMap<String, u64>,
    pub notifies: Vec<ActionLogEntry>,
}

impl WindowSummary {
    /// Critical-level notifications inside the window.
    pub fn critical_notifies(&self) -> usize {
        self.notifies
            .iter()
            .filter(|e| e.level() == Some("critical"))
            .count()
    }
}

/// The oversight task.
pub struct Supervisor {
    action_log: Arc<dyn ActionLogStore>,
    dispatcher: ToolDispatcher,
    state: Arc<dyn StateStore>,
    config: SupervisorConfig,
}

impl Supervisor {
    pub fn new(
        action_log: Arc<dyn ActionLogStore>,
        dispatcher: ToolDispatcher,
        state: Arc<dyn StateStore>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            action_log,
            dispatcher,
            state,
            config,
        }
    }

    /// Summarize log entries from the last `minutes`. Timestamps parse
    /// leniently as UTC; entries without a parseable timestamp are
    /// discarded.
    pub fn summarize_window(&self, minutes: i64) -> WindowSummary {
        let cutoff = Utc::now() - ChronoDuration::minutes(minutes);
        let mut by_action: BTreeMap<String, u64> = BTreeMap::new();
        let mut notifies = Vec::new();
        let mut total = 0;

        for entry in self.action_log.read_all() {
            let Some(ts) = entry.timestamp() else { continue };
            if ts < cutoff {
                continue;
            }
            total += 1;
            if let Some(action) = entry.action() {
                *by_action.entry(action.to_string()).or_insert(0) += 1;
                if action == "notify" {
                    notifies.push(entry);
                }
            }
        }

        WindowSummary {
            window_minutes: minutes,
            total_actions: total,
            by_action,
            notifies,
        }
    }

    /// Unique order ids (first seen wins) from `order_delay` events logged
    /// inside the window. Producer and triage entries both embed the event.
    fn recent_order_delays(&self, minutes: i64) -> Vec<String> {
        let cutoff = Utc::now() - ChronoDuration::minutes(minutes);
        let mut seen = HashSet::new();
        let mut order_ids = Vec::new();

        for entry in self.action_log.read_all() {
            let Some(ts) = entry.timestamp() else { continue };
            if ts < cutoff {
                continue;
            }
            let Some(event) = entry.event() else { continue };
            if event.get("type").and_then(Value::as_str) != Some("order_delay") {
                continue;
            }
            let Some(order_id) = event
                .get("payload")
                .and_then(|p| p.get("order_id"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            if seen.insert(order_id.to_string()) {
                order_ids.push(order_id.to_string());
            }
        }
        order_ids
    }

    /// One oversight pass.
    pub fn tick(&self) -> DomainResult<()> {
        let window = self.config.window_minutes;
        let summary = self.summarize_window(window);
        self.action_log.record(entry(json!({
            "agent": "Supervisor",
            "summary": summary
        })));

        // Escalation is a plain per-tick threshold check: it refires every
        // tick while the window still holds enough criticals.
        let criticals = summary.critical_notifies();
        if criticals >= self.config.escalation_threshold {
            self.dispatcher.notify(
                "supervisor",
                &format!("Escalation: {criticals} critical events in the last {window} minutes"),
                "critical",
            );
        }

        // Reschedule any delayed order still inside the window. No dedup
        // state is kept across ticks, so a lingering delay is re-pushed
        // each pass until it ages out of the window.
        for order_id in self.recent_order_delays(window) {
            self.dispatcher.reschedule_order(&order_id, 2.0);
            self.dispatcher.notify(
                "planner",
                &format!("Order {order_id} auto-rescheduled by supervisor"),
                "info",
            );
        }

        self.daily_digest()?;
        Ok(())
    }

    /// Emit the daily digest at most once per UTC calendar day, across
    /// restarts, by persisting the last digest date.
    fn daily_digest(&self) -> DomainResult<()> {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let state = self.state.load();
        if state.digested_on(&today) {
            return Ok(());
        }
        let day_summary = self.summarize_window(24 * 60);
        self.action_log.record(entry(json!({
            "agent": "Supervisor",
            "daily_summary": day_summary
        })));
        self.dispatcher
            .notify("supervisor", "Daily summary logged by supervisor", "info");
        self.state.save(&SupervisorState {
            last_daily_summary: Some(today),
        })?;
        Ok(())
    }

    /// Tick forever on the configured interval.
    pub async fn run_loop(&self) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.tick() {
                self.action_log.record(entry(json!({
                    "agent": "Supervisor",
                    "error": e.to_string()
                })));
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
