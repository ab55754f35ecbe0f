//! Ingestion pipeline: classify, deduplicate, persist
//!
//! Raw lines are classified in arrival order, filtered against the identity
//! index, and appended to the persisted log synchronously before the call
//! returns. The on-disk log and the in-memory index are consistent at every
//! observable point: a key is only recorded as seen once its record has been
//! flushed.

use crate::dedup::DedupIndex;
use crate::error::Result;
use crate::event::EventRecord;
use crate::patterns::PatternTable;
use crate::store::EventLog;
use std::sync::Arc;

/// Result of one ingestion cycle
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Newly accepted records in arrival order
    pub accepted: Vec<EventRecord>,
    /// Subset of `accepted` with critical priority, for immediate surfacing
    pub critical: Vec<EventRecord>,
}

/// Stateful ingestion pipeline bound to one event log
pub struct Ingestor {
    log: EventLog,
    index: DedupIndex,
    patterns: Arc<PatternTable>,
}

impl Ingestor {
    /// Create a pipeline, replaying the persisted log into the dedup index
    ///
    /// The replay completes before the first batch is processed, so no
    /// duplicate is ever re-appended after a restart.
    pub fn new(log: EventLog, patterns: Arc<PatternTable>) -> Result<Self> {
        let history = log.load()?;
        let index = DedupIndex::from_records(&history);
        tracing::info!(
            "Replayed {} events ({} distinct) from {}",
            history.len(),
            index.len(),
            log.path().display()
        );
        Ok(Self {
            log,
            index,
            patterns,
        })
    }

    /// Process one raw batch in arrival order
    ///
    /// Lines whose identity key is already known are dropped silently. Each
    /// accepted record is appended to the log before its key enters the
    /// index, so a write failure leaves the record unrecorded on both sides
    /// and the next cycle retries it.
    pub fn ingest(&mut self, batch: &[String]) -> Result<IngestOutcome> {
        let mut outcome = IngestOutcome::default();

        for raw_line in batch {
            let record = self.patterns.classify(raw_line);
            let key = record.identity_key();
            if self.index.contains(&key) {
                continue;
            }

            self.log.append(&record)?;
            self.index.insert(key);

            if record.is_critical() {
                outcome.critical.push(record.clone());
            }
            outcome.accepted.push(record);
        }

        if !outcome.accepted.is_empty() {
            tracing::info!(
                "Accepted {} new event(s) ({} critical)",
                outcome.accepted.len(),
                outcome.critical.len()
            );
        }

        Ok(outcome)
    }

    /// Number of distinct events on record
    pub fn seen_count(&self) -> usize {
        self.index.len()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}
