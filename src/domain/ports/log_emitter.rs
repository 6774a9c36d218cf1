//! Log emission port.

use crate::domain::models::ActionLogEntry;

/// Narrow interface the action log store calls after a successful write.
///
/// Separates the durable write (synchronous, succeeds or fails cleanly)
/// from observer notification (best-effort, failures isolated). The store
/// depends on this port, never on the broadcaster itself.
pub trait LogEmitter: Send + Sync {
    fn log_written(&self, entry: &ActionLogEntry);
}
