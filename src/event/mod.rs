//! Event record model
//!
//! Canonical representation of one gateway log line: parsed timestamp,
//! severity classification, and the verbatim message text. Records carry a
//! deterministic identity key used for exact-match deduplication.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event priority as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Link-layer failures (T3 timeouts, ranging failures)
    Critical,
    /// Recoverable faults
    Error,
    /// Degraded-signal indicators
    Warning,
    /// Informational status messages
    Notice,
    /// Fallback bucket for severity tokens the table does not recognize
    Unknown,
}

impl Priority {
    /// All priority buckets in display order
    pub const ALL: [Priority; 5] = [
        Priority::Critical,
        Priority::Error,
        Priority::Warning,
        Priority::Notice,
        Priority::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::Error => "error",
            Priority::Warning => "warning",
            Priority::Notice => "notice",
            Priority::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported log entry from the monitored gateway
///
/// Persisted as one JSON object per line in the event log. The `message`
/// field is kept verbatim: identity is exact-match over the literal string,
/// with no whitespace or case normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event timestamp (UTC); the Unix epoch when the device-local text
    /// representation could not be parsed
    pub time: DateTime<Utc>,
    /// Severity classification
    pub priority: Priority,
    /// Free-text description, verbatim from the device
    pub message: String,
}

impl EventRecord {
    pub fn new(time: DateTime<Utc>, priority: Priority, message: impl Into<String>) -> Self {
        Self {
            time,
            priority,
            message: message.into(),
        }
    }

    /// Sentinel timestamp for lines whose time field could not be parsed
    pub fn sentinel_time() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    /// Deterministic fingerprint over `time|priority|message`
    ///
    /// Two records are the same event iff their keys match exactly. BLAKE3
    /// gives collision resistance far beyond what exact-match deduplication
    /// needs; the hex digest is truncated the same way blob hashes are
    /// truncated elsewhere in the ecosystem.
    pub fn identity_key(&self) -> String {
        let canonical = format!(
            "{}|{}|{}",
            self.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.priority,
            self.message
        );
        let hash = blake3::hash(canonical.as_bytes());
        format!("{:.32}", hash.to_hex())
    }

    pub fn is_critical(&self) -> bool {
        self.priority == Priority::Critical
    }
}
