//! Domain errors for the floorwatch triage core.

use thiserror::Error;

use crate::domain::ports::errors::StorageError;

/// Domain-level errors that can occur while processing events.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Classifier failure: {0}")]
    Classifier(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
