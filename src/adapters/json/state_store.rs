//! JSON file supervisor state store.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::domain::models::SupervisorState;
use crate::domain::ports::errors::StorageError;
use crate::domain::ports::StateStore;

use super::{read_or_default, write_atomic};

/// Single-object store backing the daily-digest dedup.
pub struct JsonStateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> SupervisorState {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        read_or_default(&self.path)
    }

    fn save(&self, state: &SupervisorState) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        write_atomic(&self.path, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_state() {
        let dir = TempDir::new().unwrap();
        let store = JsonStateStore::new(dir.path().join("supervisor_state.json"));

        assert_eq!(store.load(), SupervisorState::default());

        let state = SupervisorState {
            last_daily_summary: Some("2026-08-29".to_string()),
        };
        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
        assert!(store.load().digested_on("2026-08-29"));
    }
}
