//! Plant inventory records read by the producer scan loops.
//!
//! `machines.json` and `orders.json` are external inputs maintained by the
//! site; the scans only read them. Records serialize whole as event
//! payloads, so unknown fields are carried through.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One machine on the shop floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub vibration: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One production order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(default = "default_due_in_hours")]
    pub due_in_hours: f64,
    #[serde(default)]
    pub progress: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_due_in_hours() -> f64 {
    999.0
}

impl Order {
    /// Percentage of the order still outstanding, floored at zero.
    pub fn delay_percent(&self) -> f64 {
        (100.0 - self.progress).max(0.0)
    }
}
