//! Drop statistics tracking.
//!
//! Thread-safe counters for inputs the engine discarded, shared between the
//! engine task and the status server.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::DropReason;

/// Thread-safe drop statistics tracker.
///
/// One atomic counter per [`DropReason`], all initialized to zero on
/// creation. Share across tasks with `Arc`.
#[derive(Debug)]
pub struct DropStats {
    counts: HashMap<DropReason, AtomicUsize>,
}

impl Default for DropStats {
    fn default() -> Self {
        Self::new()
    }
}

impl DropStats {
    pub fn new() -> Self {
        let mut counts = HashMap::new();
        for reason in DropReason::iter() {
            counts.insert(reason, AtomicUsize::new(0));
        }
        DropStats { counts }
    }

    /// Increment the counter for a drop reason.
    pub fn increment(&self, reason: DropReason) {
        if let Some(counter) = self.counts.get(&reason) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment drop counter for {:?} which is not in the map. \
                 This indicates a bug in DropStats initialization.",
                reason
            );
        }
    }

    /// Get the count for a drop reason.
    pub fn get_count(&self, reason: DropReason) -> usize {
        self.counts
            .get(&reason)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total count across all reasons.
    pub fn total(&self) -> usize {
        DropReason::iter().map(|r| self.get_count(r)).sum()
    }

    /// Returns every counter keyed by its snake_case name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, usize> {
        DropReason::iter()
            .map(|r| (r.key(), self.get_count(r)))
            .collect()
    }
}
