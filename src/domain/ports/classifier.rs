//! Classifier port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Event, TriageOutput};

/// Primary-path classifier contract.
///
/// Implementations may delegate to an external reasoning service with a
/// bounded timeout. Any transport failure, timeout, or result-shape
/// violation must come back as an `Err` — the engine catches it at this
/// boundary and recovers via the deterministic rule fallback. Unvalidated
/// external data never enters the pipeline.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, event: &Event) -> DomainResult<TriageOutput>;
}
