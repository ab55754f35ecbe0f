//! Identity index over previously seen events
//!
//! The index is rebuilt from the persisted log at startup and updated
//! incrementally as new records are accepted. It is never itself persisted:
//! the log is the durable store and the index is fully reconstructible
//! from it.

use crate::event::EventRecord;
use ahash::{HashSet, HashSetExt};

/// Set of identity keys for every event already persisted
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Rebuild the index from the full persisted history
    pub fn from_records(records: &[EventRecord]) -> Self {
        let mut index = Self::new();
        for record in records {
            index.seen.insert(record.identity_key());
        }
        index
    }

    /// O(1) amortized membership test
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Insert a key, returning whether it was newly added
    pub fn insert(&mut self, key: String) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
