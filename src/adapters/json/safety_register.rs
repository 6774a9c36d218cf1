//! JSON file safety register.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::domain::models::{SafetyLogEntry, SafetyStatus};
use crate::domain::ports::errors::StorageError;
use crate::domain::ports::SafetyRegister;

use super::{read_or_default, write_atomic};

/// Safety incidents persisted as a JSON array, same atomic-write
/// discipline as the action log.
pub struct JsonSafetyRegister {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonSafetyRegister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl SafetyRegister for JsonSafetyRegister {
    fn mark_resolved(&self, id: &str) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<SafetyLogEntry> = read_or_default(&self.path);
        let Some(entry) = entries.iter_mut().find(|e| e.id == id && e.is_unresolved()) else {
            return Ok(false);
        };
        entry.status = SafetyStatus::Resolved;
        write_atomic(&self.path, &entries)?;
        Ok(true)
    }

    fn load(&self) -> Vec<SafetyLogEntry> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        read_or_default(&self.path)
    }
}
