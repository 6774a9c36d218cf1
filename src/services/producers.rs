//! Periodic producer scans.
//!
//! Three independent loops watch the plant inputs and publish events into
//! the queue: shop-floor temperature, order backlog, and the safety
//! register. Producers only ever call `publish`; they never touch the
//! pipeline directly, and each loop swallows its own errors.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

use crate::domain::models::{Event, Machine, Order, ProducersConfig};
use crate::domain::ports::{ActionLogStore, SafetyRegister};
use crate::services::engine::TriageEngine;

/// Shop-floor temperature above which a `machine_upset` event is emitted.
const MACHINE_TEMP_THRESHOLD: f64 = 100.0;

/// Orders due within this many hours are candidates for delay events.
const ORDER_DUE_SOON_HOURS: f64 = 1.0;

/// Orders below this progress while due soon are considered delayed.
const ORDER_PROGRESS_FLOOR: f64 = 80.0;

/// The producer set, sharing one engine handle.
pub struct Producers {
    engine: Arc<TriageEngine>,
    action_log: Arc<dyn ActionLogStore>,
    safety: Arc<dyn SafetyRegister>,
    machines_path: PathBuf,
    orders_path: PathBuf,
    config: ProducersConfig,
}

impl Producers {
    pub fn new(
        engine: Arc<TriageEngine>,
        action_log: Arc<dyn ActionLogStore>,
        safety: Arc<dyn SafetyRegister>,
        data_dir: impl Into<PathBuf>,
        config: ProducersConfig,
    ) -> Self {
        let data_dir = data_dir.into();
        Self {
            engine,
            action_log,
            safety,
            machines_path: data_dir.join("machines.json"),
            orders_path: data_dir.join("orders.json"),
            config,
        }
    }

    /// One shop-floor pass: every machine running hot emits an upset event
    /// carrying the full machine record.
    pub fn shopfloor_scan(&self) -> usize {
        let machines: Vec<Machine> = match read_inventory(&self.machines_path) {
            Ok(m) => m,
            Err(e) => {
                self.action_log
                    .record(entry(json!({"actor": "ShopFloorAgent", "error": e})));
                return 0;
            }
        };
        let mut published = 0;
        for machine in machines {
            if machine.temperature > MACHINE_TEMP_THRESHOLD {
                let event = Event::new("ShopFloorAgent", "machine_upset", payload_of(&machine));
                self.action_log
                    .record(entry(json!({"agent": "ShopFloorAgent", "event": event})));
                self.engine.publish(event);
                published += 1;
            }
        }
        published
    }

    /// One backlog pass: orders due within the hour and well behind on
    /// progress emit a delay event with the outstanding percentage.
    pub fn order_scan(&self) -> usize {
        let orders: Vec<Order> = match read_inventory(&self.orders_path) {
            Ok(o) => o,
            Err(e) => {
                self.action_log
                    .record(entry(json!({"actor": "OrderAgent", "error": e})));
                return 0;
            }
        };
        let mut published = 0;
        for order in orders {
            if order.due_in_hours <= ORDER_DUE_SOON_HOURS && order.progress < ORDER_PROGRESS_FLOOR {
                let event = Event::new(
                    "OrderAgent",
                    "order_delay",
                    entry(json!({
                        "order_id": order.order_id,
                        "progress": order.progress,
                        "due_in_hours": order.due_in_hours,
                        "delay_percent": order.delay_percent(),
                    })),
                );
                self.action_log
                    .record(entry(json!({"agent": "OrderAgent", "event": event})));
                self.engine.publish(event);
                published += 1;
            }
        }
        published
    }

    /// One safety pass: every unresolved incident is republished for
    /// triage. The engine resolves it afterwards via the payload id, so an
    /// incident stops being emitted once resolution lands.
    pub fn safety_scan(&self) -> usize {
        let mut published = 0;
        for incident in self.safety.load() {
            if incident.is_unresolved() {
                let event = Event::new(
                    "SafetyAgent",
                    incident.event_type.clone(),
                    payload_of(&incident),
                );
                self.action_log
                    .record(entry(json!({"agent": "SafetyAgent", "event": event})));
                self.engine.publish(event);
                published += 1;
            }
        }
        published
    }

    /// Spawn the three scan loops on their configured intervals.
    pub fn spawn(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let shopfloor = {
            let p = Arc::clone(&self);
            let every = Duration::from_secs(p.config.shopfloor_interval_secs);
            tokio::spawn(async move {
                loop {
                    p.shopfloor_scan();
                    tokio::time::sleep(every).await;
                }
            })
        };
        let orders = {
            let p = Arc::clone(&self);
            let every = Duration::from_secs(p.config.order_interval_secs);
            tokio::spawn(async move {
                loop {
                    p.order_scan();
                    tokio::time::sleep(every).await;
                }
            })
        };
        let safety = {
            let p = Arc::clone(&self);
            let every = Duration::from_secs(p.config.safety_interval_secs);
            tokio::spawn(async move {
                loop {
                    p.safety_scan();
                    tokio::time::sleep(every).await;
                }
            })
        };
        vec![shopfloor, orders, safety]
    }
}

fn read_inventory<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<Vec<T>, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("{}: {e}", path.display()))
}

fn payload_of<T: serde::Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn entry(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
