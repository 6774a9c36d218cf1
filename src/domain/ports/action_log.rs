//! Action log store port.

use serde_json::{Map, Value};

use crate::domain::models::ActionLogEntry;
use crate::domain::ports::errors::StorageError;

/// Durable, logically append-only record of every tool invocation and
/// diagnostic event. Writes stamp the entry timestamp; the collection is
/// newest-first. Read failures degrade to an empty collection (best-effort
/// availability over strict consistency).
pub trait ActionLogStore: Send + Sync {
    /// Append one entry, stamping its timestamp at write time. A write
    /// failure propagates only to the immediate caller.
    fn append(&self, fields: Map<String, Value>) -> Result<ActionLogEntry, StorageError>;

    /// All entries, newest first. Empty on read failure.
    fn read_all(&self) -> Vec<ActionLogEntry>;

    /// Append, swallowing write failures with a warning. For call sites
    /// where logging must never abort the surrounding pipeline.
    fn record(&self, fields: Map<String, Value>) {
        if let Err(e) = self.append(fields) {
            tracing::warn!("failed to append action log entry: {e}");
        }
    }
}
