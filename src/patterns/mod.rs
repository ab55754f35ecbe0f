//! Pattern table for configuration-driven event classification
//!
//! This module provides:
//! - Severity token mapping (device severity word -> priority bucket)
//! - Pre-compiled message patterns evaluated in declaration order
//! - Upstream channel extraction from failure messages
//!
//! All classification behavior is data-driven: the table is built from the
//! `[patterns]` configuration section, whose serde defaults carry the DOCSIS
//! pattern set the gateway is known to emit.

use crate::error::{HubwatchError, Result};
use crate::event::{EventRecord, Priority};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Severity token mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityPattern {
    /// Severity word as it appears in the raw line (matched case-insensitively)
    pub token: String,
    /// Priority bucket the token maps to
    pub priority: Priority,
}

/// Semantic category a message pattern assigns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    /// 16 consecutive T3 timeouts on an upstream channel
    ConsecutiveTimeout,
    /// Ranging retries exhausted
    RetriesExhausted,
    /// No ranging response received
    NoResponse,
    /// Start of a T3 timeout sequence
    T3TimeoutStart,
    /// MDD message timeout (warning)
    MddTimeout,
    /// DBC-REQ mismatch (warning)
    DbcMismatch,
    /// CM-STATUS status report (notice)
    CmStatus,
    /// Upstream profile assignment change (notice)
    ProfileChange,
    /// Administrative login (notice)
    Login,
}

/// Message pattern configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePattern {
    pub name: String,
    pub pattern: String,
    pub category: MessageCategory,
}

/// Pattern configuration section
///
/// Declaration order is significant: critical-event categorization uses the
/// first matching pattern (a "16 consecutive T3 timeouts" line also contains
/// "T3 time-out" and must win).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    #[serde(default = "default_severities")]
    pub severities: Vec<SeverityPattern>,
    #[serde(default = "default_messages")]
    pub messages: Vec<MessagePattern>,
    /// Capture pattern for the upstream channel number in failure messages
    #[serde(default = "default_channel_pattern")]
    pub channel_pattern: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            severities: default_severities(),
            messages: default_messages(),
            channel_pattern: default_channel_pattern(),
        }
    }
}

fn default_severities() -> Vec<SeverityPattern> {
    let tokens = [
        ("critical", Priority::Critical),
        ("error", Priority::Error),
        ("warning", Priority::Warning),
        ("notice", Priority::Notice),
    ];
    tokens
        .into_iter()
        .map(|(token, priority)| SeverityPattern {
            token: token.to_string(),
            priority,
        })
        .collect()
}

fn default_messages() -> Vec<MessagePattern> {
    let patterns = [
        (
            "consecutive_timeout",
            "16 consecutive T3 timeouts",
            MessageCategory::ConsecutiveTimeout,
        ),
        (
            "retries_exhausted",
            "Retries exhausted",
            MessageCategory::RetriesExhausted,
        ),
        (
            "no_response_t3",
            "No Response received - T3 time-out",
            MessageCategory::NoResponse,
        ),
        (
            "no_ranging_response",
            "No Ranging Response received",
            MessageCategory::NoResponse,
        ),
        (
            "t3_timeout_start",
            "T3 time-out",
            MessageCategory::T3TimeoutStart,
        ),
        (
            "mdd_timeout",
            "MDD message timeout",
            MessageCategory::MddTimeout,
        ),
        (
            "dbc_mismatch",
            "DBC-REQ Mismatch",
            MessageCategory::DbcMismatch,
        ),
        ("cm_status", "CM-STATUS", MessageCategory::CmStatus),
        (
            "profile_change",
            "US profile assignment change",
            MessageCategory::ProfileChange,
        ),
        ("login", "Login", MessageCategory::Login),
    ];
    patterns
        .into_iter()
        .map(|(name, pattern, category)| MessagePattern {
            name: name.to_string(),
            pattern: pattern.to_string(),
            category,
        })
        .collect()
}

fn default_channel_pattern() -> String {
    r"upstream channel\s*(\d+)".to_string()
}

/// Compiled message pattern with pre-compiled regex
#[derive(Debug, Clone)]
pub struct CompiledMessagePattern {
    pub name: String,
    pub regex: Regex,
    pub category: MessageCategory,
}

/// Pattern table with all pre-compiled patterns
#[derive(Debug, Clone)]
pub struct PatternTable {
    /// Severity tokens, lowercased for case-insensitive lookup
    severities: Vec<(String, Priority)>,
    /// Message patterns in declaration order
    messages: Vec<CompiledMessagePattern>,
    /// Upstream channel capture pattern
    channel: Regex,
}

impl PatternTable {
    /// Compile the pattern table from configuration
    pub fn compile(config: &PatternsConfig) -> Result<Self> {
        let severities = config
            .severities
            .iter()
            .map(|s| (s.token.to_ascii_lowercase(), s.priority))
            .collect();

        let messages = config
            .messages
            .iter()
            .map(|m| {
                let regex = Regex::new(&m.pattern).map_err(|e| HubwatchError::Pattern {
                    name: m.name.clone(),
                    source: e,
                })?;
                Ok(CompiledMessagePattern {
                    name: m.name.clone(),
                    regex,
                    category: m.category,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let channel = Regex::new(&config.channel_pattern).map_err(|e| HubwatchError::Pattern {
            name: "channel_pattern".to_string(),
            source: e,
        })?;

        Ok(Self {
            severities,
            messages,
            channel,
        })
    }

    /// Parse a raw log line into a structured event record
    ///
    /// Expected shape is `<timestamp> <severity> <message...>`. A line that
    /// does not lead with a parseable RFC 3339 timestamp falls back to the
    /// epoch sentinel; an unrecognized severity token falls into the unknown
    /// bucket and remains part of the message. No line is ever rejected.
    pub fn classify(&self, raw_line: &str) -> EventRecord {
        let line = raw_line.trim();

        let (time, remainder) = match line.split_once(char::is_whitespace) {
            Some((first, rest)) => match chrono::DateTime::parse_from_rfc3339(first) {
                Ok(parsed) => (parsed.with_timezone(&chrono::Utc), rest.trim_start()),
                Err(_) => (EventRecord::sentinel_time(), line),
            },
            None => match chrono::DateTime::parse_from_rfc3339(line) {
                Ok(parsed) => (parsed.with_timezone(&chrono::Utc), ""),
                Err(_) => (EventRecord::sentinel_time(), line),
            },
        };

        match remainder.split_once(char::is_whitespace) {
            Some((token, message)) => match self.severity_of(token) {
                Some(priority) => EventRecord::new(time, priority, message.trim_start()),
                None => EventRecord::new(time, Priority::Unknown, remainder),
            },
            None => match self.severity_of(remainder) {
                Some(priority) => EventRecord::new(time, priority, ""),
                None => EventRecord::new(time, Priority::Unknown, remainder),
            },
        }
    }

    /// Look up the priority bucket for a severity token
    pub fn severity_of(&self, token: &str) -> Option<Priority> {
        let token = token.to_ascii_lowercase();
        self.severities
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, p)| *p)
    }

    /// Category of the first pattern matching the message, in declaration order
    pub fn first_category(&self, message: &str) -> Option<MessageCategory> {
        self.messages
            .iter()
            .find(|p| p.regex.is_match(message))
            .map(|p| p.category)
    }

    /// Whether any pattern of the given category matches the message
    pub fn matches(&self, message: &str, category: MessageCategory) -> bool {
        self.messages
            .iter()
            .filter(|p| p.category == category)
            .any(|p| p.regex.is_match(message))
    }

    /// Extract the upstream channel number from a failure message
    pub fn channel_of(&self, message: &str) -> Option<u32> {
        self.channel
            .captures(message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn table() -> PatternTable {
        PatternTable::compile(&PatternsConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_well_formed_line() {
        let record = table().classify(
            "2025-01-01T00:00:00Z CRITICAL Started Unicast Maintenance Ranging - No Response received - T3 time-out",
        );
        assert_eq!(
            record.time,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(record.priority, Priority::Critical);
        assert!(record.message.starts_with("Started Unicast"));
    }

    #[test]
    fn test_classify_severity_case_insensitive() {
        let table = table();
        assert_eq!(
            table
                .classify("2025-01-01T00:00:00Z warning MDD message timeout")
                .priority,
            Priority::Warning
        );
        assert_eq!(
            table.classify("2025-01-01T00:00:00Z Notice Login").priority,
            Priority::Notice
        );
    }

    #[test]
    fn test_classify_malformed_timestamp_falls_back_to_sentinel() {
        let record = table().classify("not-a-time CRITICAL something broke");
        assert_eq!(record.time, EventRecord::sentinel_time());
        // The leading token was not a timestamp, so the whole line stays
        // together and "not-a-time" is not a severity either.
        assert_eq!(record.priority, Priority::Unknown);
        assert_eq!(record.message, "not-a-time CRITICAL something broke");
    }

    #[test]
    fn test_classify_unknown_severity_keeps_token_in_message() {
        let record = table().classify("2025-01-01T00:00:00Z DEBUG something odd");
        assert_eq!(record.priority, Priority::Unknown);
        assert_eq!(record.message, "DEBUG something odd");
    }

    #[test]
    fn test_classify_never_rejects() {
        let table = table();
        for raw in ["", "   ", "garbage", "2025-01-01T00:00:00Z"] {
            let record = table.classify(raw);
            // Every line yields a usable identity key
            assert_eq!(record.identity_key().len(), 32);
        }
    }

    #[test]
    fn test_first_category_declaration_order_wins() {
        let table = table();
        // Contains both the consecutive-timeout template and the bare
        // "T3 time-out" substring; the earlier pattern must win.
        let message = "16 consecutive T3 timeouts while trying to range on upstream channel 2";
        assert_eq!(
            table.first_category(message),
            Some(MessageCategory::ConsecutiveTimeout)
        );
        assert_eq!(
            table.first_category(
                "Started Unicast Maintenance Ranging - No Response received - T3 time-out"
            ),
            Some(MessageCategory::NoResponse)
        );
        assert_eq!(table.first_category("nothing recognizable"), None);
    }

    #[test]
    fn test_matches_by_category() {
        let table = table();
        assert!(table.matches(
            "MDD message timeout;CM-MAC=00:00:00:00:00:00;",
            MessageCategory::MddTimeout
        ));
        assert!(!table.matches("MDD message timeout", MessageCategory::DbcMismatch));
    }

    #[test]
    fn test_channel_extraction() {
        let table = table();
        assert_eq!(
            table.channel_of(
                "16 consecutive T3 timeouts while trying to range on upstream channel 5;CM-MAC=..."
            ),
            Some(5)
        );
        assert_eq!(table.channel_of("upstream channel 12"), Some(12));
        assert_eq!(table.channel_of("no channel here"), None);
    }

    #[test]
    fn test_compile_rejects_bad_pattern() {
        let config = PatternsConfig {
            channel_pattern: "(unclosed".to_string(),
            ..PatternsConfig::default()
        };
        assert!(PatternTable::compile(&config).is_err());
    }
}
