//! Safety register port.

use crate::domain::models::SafetyLogEntry;
use crate::domain::ports::errors::StorageError;

/// Durable set of safety incidents with a one-way status transition.
pub trait SafetyRegister: Send + Sync {
    /// Flip the first entry with this id whose status is not already
    /// resolved and persist atomically. `Ok(false)` when no matching
    /// unresolved entry exists, which makes repeat calls idempotent no-ops.
    fn mark_resolved(&self, id: &str) -> Result<bool, StorageError>;

    /// All incidents on file. Empty on read failure.
    fn load(&self) -> Vec<SafetyLogEntry>;
}
