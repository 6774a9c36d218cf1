//! Aggregate memory maintained by the triage engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::TriageOutput;

/// Running aggregate state over all processed events. Owned exclusively by
/// the engine, mutated strictly after a triage decision and its tool calls
/// (not rolled back on partial tool failure), reset on process restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryState {
    pub events_processed: u64,
    pub counts_by_category: BTreeMap<String, u64>,
    pub counts_by_severity: BTreeMap<String, u64>,
    pub last_triage: Option<TriageOutput>,
}

impl MemoryState {
    /// Fold one triage decision into the aggregates, using the severity and
    /// category exactly as returned by the classifier.
    pub fn record(&mut self, triage: &TriageOutput) {
        self.events_processed += 1;
        *self.counts_by_category.entry(triage.category.clone()).or_insert(0) += 1;
        *self
            .counts_by_severity
            .entry(triage.severity.as_str().to_string())
            .or_insert(0) += 1;
        self.last_triage = Some(triage.clone());
    }
}
