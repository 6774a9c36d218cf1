//! Durable JSON file stores.
//!
//! All three stores share the same discipline: a mutex around the
//! read-modify-write cycle, and atomic replace via write-to-temp then
//! rename, so a crash mid-write never leaves a truncated or unparsable
//! file behind. Readers always see either the old or the new complete
//! collection.

mod action_log;
mod safety_register;
mod state_store;

pub use action_log::JsonActionLog;
pub use safety_register::JsonSafetyRegister;
pub use state_store::JsonStateStore;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::ports::errors::StorageError;

/// Serialize `value` to a sibling temp file, then rename over `path`.
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a JSON value from `path`, degrading to the default on a missing
/// file, unreadable content, or a shape mismatch.
fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), "unreadable store file: {e}");
            }
            return T::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path.display(), "malformed store file, treating as empty: {e}");
            T::default()
        }
    }
}
