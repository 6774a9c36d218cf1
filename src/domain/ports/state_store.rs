//! Supervisor state store port.

use crate::domain::models::SupervisorState;
use crate::domain::ports::errors::StorageError;

/// Durable single-object store for [`SupervisorState`].
pub trait StateStore: Send + Sync {
    /// Current state; defaults on read failure or missing file.
    fn load(&self) -> SupervisorState;

    /// Persist the state atomically.
    fn save(&self, state: &SupervisorState) -> Result<(), StorageError>;
}
