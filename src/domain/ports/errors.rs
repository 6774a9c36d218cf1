//! Errors surfaced by the durable store ports.

use thiserror::Error;

/// Failures in the durable JSON store read/write cycle.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
