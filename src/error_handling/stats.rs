//! Processing statistics tracking.
//!
//! Counters for every [`OutcomeType`], initialized to zero on creation so the
//! end-of-run summary can iterate them in a stable order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::OutcomeType;

/// Thread-safe outcome statistics tracker.
///
/// Uses atomic counters, so a shared `Arc<ProcessingStats>` can be read by a
/// progress reporter while the pipeline updates it.
pub struct ProcessingStats {
    outcomes: HashMap<OutcomeType, AtomicUsize>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in OutcomeType::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }
        ProcessingStats { outcomes }
    }

    /// Increment an outcome counter.
    pub fn increment(&self, outcome: OutcomeType) {
        if let Some(counter) = self.outcomes.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                outcome
            );
        }
    }

    /// Get the count for an outcome.
    pub fn get(&self, outcome: OutcomeType) -> usize {
        self.outcomes
            .get(&outcome)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Sum of all failure-reason counters.
    pub fn total_failures(&self) -> usize {
        OutcomeType::iter()
            .filter(OutcomeType::is_failure_reason)
            .map(|outcome| self.get(outcome))
            .sum()
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
