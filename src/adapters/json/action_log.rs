//! JSON file action log.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::domain::models::ActionLogEntry;
use crate::domain::ports::errors::StorageError;
use crate::domain::ports::{ActionLogStore, LogEmitter};

use super::{read_or_default, write_atomic};

/// Action log persisted as a newest-first JSON array.
///
/// The whole collection is rewritten per append under the mutex; the write
/// lands via temp-file-then-rename. After a successful write the entry is
/// handed to the optional [`LogEmitter`] outside the lock.
pub struct JsonActionLog {
    path: PathBuf,
    lock: Mutex<()>,
    emitter: Option<Arc<dyn LogEmitter>>,
}

impl JsonActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            emitter: None,
        }
    }

    /// Attach an emitter notified after each successful write.
    pub fn with_emitter(mut self, emitter: Arc<dyn LogEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }
}

impl ActionLogStore for JsonActionLog {
    fn append(&self, fields: Map<String, Value>) -> Result<ActionLogEntry, StorageError> {
        let entry = {
            let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut entries: Vec<ActionLogEntry> = read_or_default(&self.path);
            let entry = ActionLogEntry::stamped(fields);
            entries.insert(0, entry.clone());
            write_atomic(&self.path, &entries)?;
            entry
        };
        if let Some(emitter) = &self.emitter {
            emitter.log_written(&entry);
        }
        Ok(entry)
    }

    fn read_all(&self) -> Vec<ActionLogEntry> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        read_or_default(&self.path)
    }
}
