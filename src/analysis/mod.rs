//! Log analysis engine
//!
//! A stateless, pure transform from the full persisted event history to an
//! `AnalysisSummary`: priority breakdown, critical-issue detail, per-channel
//! failure counts, outage periods, warning and status tallies, and
//! recommendations. The summary is rebuilt fully on every run.

pub mod outage;
pub mod recommend;

pub use outage::{detect_outages, OutagePeriod};

use crate::config::AnalysisConfig;
use crate::event::{EventRecord, Priority};
use crate::patterns::{MessageCategory, PatternTable};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Earliest and latest parsed timestamp in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One bucket of the priority histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
    /// Share of the total, in percent; zero for an empty history
    pub percent: f64,
}

/// Aggregated detail over critical events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalDetail {
    pub total: usize,
    pub t3_timeout_starts: usize,
    pub retries_exhausted: usize,
    pub consecutive_timeouts: usize,
    pub no_response: usize,
    /// Channels named in consecutive-timeout messages, deduplicated and sorted
    pub affected_channels: Vec<u32>,
}

/// Failure count for one upstream channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFailureCount {
    pub channel: u32,
    pub failures: usize,
}

/// Frequency tally for one error message template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTypeCount {
    pub message_type: String,
    pub count: usize,
}

/// Tallies over warning-priority events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningTally {
    pub total: usize,
    pub mdd_timeouts: usize,
    pub dbc_mismatches: usize,
}

/// Tallies over notice-priority events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeTally {
    pub total: usize,
    pub cm_status: usize,
    pub profile_changes: usize,
    pub logins: usize,
}

/// Full analysis output; every field is serialized on export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_events: usize,
    pub date_range: Option<DateRange>,
    pub priority_breakdown: Vec<PriorityCount>,
    pub critical: CriticalDetail,
    pub channel_failures: Vec<ChannelFailureCount>,
    pub error_types: Vec<MessageTypeCount>,
    pub warnings: WarningTally,
    pub notices: NoticeTally,
    pub outages: Vec<OutagePeriod>,
    pub recommendations: Vec<String>,
}

/// Stateless analysis engine
pub struct AnalysisEngine {
    config: AnalysisConfig,
    patterns: Arc<PatternTable>,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig, patterns: Arc<PatternTable>) -> Self {
        Self { config, patterns }
    }

    /// Analyze the full event history
    ///
    /// Deterministic and side-effect free; an empty history produces an
    /// all-zero summary.
    pub fn analyze(&self, records: &[EventRecord]) -> AnalysisSummary {
        let criticals: Vec<&EventRecord> =
            records.iter().filter(|r| r.is_critical()).collect();

        let mut summary = AnalysisSummary {
            total_events: records.len(),
            date_range: date_range(records),
            priority_breakdown: priority_breakdown(records),
            critical: self.critical_detail(&criticals),
            channel_failures: self.channel_failures(&criticals),
            error_types: error_types(records),
            warnings: self.warning_tally(records),
            notices: self.notice_tally(records),
            outages: detect_outages(
                criticals.iter().copied(),
                Duration::seconds(self.config.outage_gap_secs as i64),
            ),
            recommendations: Vec::new(),
        };
        summary.recommendations = recommend::evaluate(&summary, &self.config);
        summary
    }

    fn critical_detail(&self, criticals: &[&EventRecord]) -> CriticalDetail {
        let mut detail = CriticalDetail {
            total: criticals.len(),
            ..CriticalDetail::default()
        };
        let mut channels = BTreeSet::new();

        for record in criticals {
            match self.patterns.first_category(&record.message) {
                Some(MessageCategory::ConsecutiveTimeout) => {
                    detail.consecutive_timeouts += 1;
                    if let Some(channel) = self.patterns.channel_of(&record.message) {
                        channels.insert(channel);
                    }
                }
                Some(MessageCategory::RetriesExhausted) => detail.retries_exhausted += 1,
                Some(MessageCategory::NoResponse) => detail.no_response += 1,
                Some(MessageCategory::T3TimeoutStart) => detail.t3_timeout_starts += 1,
                _ => {}
            }
        }

        detail.affected_channels = channels.into_iter().collect();
        detail
    }

    fn channel_failures(&self, criticals: &[&EventRecord]) -> Vec<ChannelFailureCount> {
        let mut failures: BTreeMap<u32, usize> = BTreeMap::new();
        for record in criticals {
            if let Some(channel) = self.patterns.channel_of(&record.message) {
                *failures.entry(channel).or_insert(0) += 1;
            }
        }
        // Zero-count channels are omitted, not zero-filled
        failures
            .into_iter()
            .map(|(channel, failures)| ChannelFailureCount { channel, failures })
            .collect()
    }

    fn warning_tally(&self, records: &[EventRecord]) -> WarningTally {
        let mut tally = WarningTally::default();
        for record in records.iter().filter(|r| r.priority == Priority::Warning) {
            tally.total += 1;
            if self.patterns.matches(&record.message, MessageCategory::MddTimeout) {
                tally.mdd_timeouts += 1;
            }
            if self.patterns.matches(&record.message, MessageCategory::DbcMismatch) {
                tally.dbc_mismatches += 1;
            }
        }
        tally
    }

    fn notice_tally(&self, records: &[EventRecord]) -> NoticeTally {
        let mut tally = NoticeTally::default();
        for record in records.iter().filter(|r| r.priority == Priority::Notice) {
            tally.total += 1;
            if self.patterns.matches(&record.message, MessageCategory::CmStatus) {
                tally.cm_status += 1;
            }
            if self.patterns.matches(&record.message, MessageCategory::ProfileChange) {
                tally.profile_changes += 1;
            }
            if self.patterns.matches(&record.message, MessageCategory::Login) {
                tally.logins += 1;
            }
        }
        tally
    }
}

/// Earliest and latest timestamp, ignoring epoch sentinels from unparseable lines
fn date_range(records: &[EventRecord]) -> Option<DateRange> {
    let times: Vec<DateTime<Utc>> = records
        .iter()
        .map(|r| r.time)
        .filter(|t| *t != EventRecord::sentinel_time())
        .collect();
    let start = times.iter().min()?;
    let end = times.iter().max()?;
    Some(DateRange {
        start: *start,
        end: *end,
    })
}

/// Count per priority bucket; percentages guard the empty-history case
fn priority_breakdown(records: &[EventRecord]) -> Vec<PriorityCount> {
    let total = records.len();
    Priority::ALL
        .iter()
        .map(|&priority| {
            let count = records.iter().filter(|r| r.priority == priority).count();
            let percent = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            PriorityCount {
                priority,
                count,
                percent,
            }
        })
        .collect()
}

/// Frequency tally of error messages keyed by their leading template segment
fn error_types(records: &[EventRecord]) -> Vec<MessageTypeCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.priority == Priority::Error) {
        let message_type = record
            .message
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        *counts.entry(message_type).or_insert(0) += 1;
    }

    let mut types: Vec<MessageTypeCount> = counts
        .into_iter()
        .map(|(message_type, count)| MessageTypeCount {
            message_type,
            count,
        })
        .collect();
    types.sort_by(|a, b| b.count.cmp(&a.count).then(a.message_type.cmp(&b.message_type)));
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternsConfig;
    use chrono::TimeZone;

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(
            AnalysisConfig::default(),
            Arc::new(PatternTable::compile(&PatternsConfig::default()).unwrap()),
        )
    }

    fn record(secs: i64, priority: Priority, message: &str) -> EventRecord {
        EventRecord::new(Utc.timestamp_opt(secs, 0).unwrap(), priority, message)
    }

    #[test]
    fn test_empty_history_yields_all_zero_summary() {
        let summary = engine().analyze(&[]);

        assert_eq!(summary.total_events, 0);
        assert!(summary.date_range.is_none());
        assert!(summary.priority_breakdown.iter().all(|b| b.count == 0));
        assert!(summary
            .priority_breakdown
            .iter()
            .all(|b| b.percent == 0.0));
        assert!(summary.outages.is_empty());
        assert!(summary.channel_failures.is_empty());
        assert!(summary.recommendations.is_empty());
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let records = vec![
            record(0, Priority::Critical, "T3 time-out"),
            record(1, Priority::Warning, "MDD message timeout"),
            record(2, Priority::Notice, "Login"),
            record(3, Priority::Unknown, "???"),
            record(4, Priority::Error, "LoS detected"),
            record(5, Priority::Error, "LoS detected again"),
        ];
        let summary = engine().analyze(&records);

        let counted: usize = summary.priority_breakdown.iter().map(|b| b.count).sum();
        assert_eq!(counted, summary.total_events);
        assert_eq!(summary.total_events, 6);
    }

    #[test]
    fn test_critical_detail_categorization() {
        let records = vec![
            record(
                0,
                Priority::Critical,
                "16 consecutive T3 timeouts while trying to range on upstream channel 1;",
            ),
            record(
                60,
                Priority::Critical,
                "16 consecutive T3 timeouts while trying to range on upstream channel 3;",
            ),
            record(120, Priority::Critical, "Ranging request Retries exhausted;"),
            record(
                180,
                Priority::Critical,
                "Started Unicast Maintenance Ranging - No Response received - T3 time-out;",
            ),
            record(240, Priority::Critical, "Unicast DSA Response T3 time-out;"),
        ];
        let summary = engine().analyze(&records);

        assert_eq!(summary.critical.total, 5);
        assert_eq!(summary.critical.consecutive_timeouts, 2);
        assert_eq!(summary.critical.retries_exhausted, 1);
        assert_eq!(summary.critical.no_response, 1);
        assert_eq!(summary.critical.t3_timeout_starts, 1);
        assert_eq!(summary.critical.affected_channels, vec![1, 3]);
    }

    #[test]
    fn test_channel_failures_sorted_and_sparse() {
        let records = vec![
            record(0, Priority::Critical, "T3 time-out on upstream channel 7;"),
            record(1, Priority::Critical, "T3 time-out on upstream channel 2;"),
            record(2, Priority::Critical, "T3 time-out on upstream channel 7;"),
            record(3, Priority::Critical, "T3 time-out without channel info"),
        ];
        let summary = engine().analyze(&records);

        assert_eq!(
            summary.channel_failures,
            vec![
                ChannelFailureCount {
                    channel: 2,
                    failures: 1
                },
                ChannelFailureCount {
                    channel: 7,
                    failures: 2
                },
            ]
        );
    }

    #[test]
    fn test_error_types_tally() {
        let records = vec![
            record(0, Priority::Error, "DHCP RENEW WARNING;CM-MAC=aa;"),
            record(1, Priority::Error, "DHCP RENEW WARNING;CM-MAC=bb;"),
            record(2, Priority::Error, "ToD request sent - No Response received;"),
        ];
        let summary = engine().analyze(&records);

        assert_eq!(summary.error_types.len(), 2);
        assert_eq!(summary.error_types[0].message_type, "DHCP RENEW WARNING");
        assert_eq!(summary.error_types[0].count, 2);
    }

    #[test]
    fn test_warning_and_notice_tallies() {
        let records = vec![
            record(0, Priority::Warning, "MDD message timeout;"),
            record(1, Priority::Warning, "DBC-REQ Mismatch Between Calculated Value;"),
            record(2, Priority::Warning, "some other warning"),
            record(3, Priority::Notice, "CM-STATUS message sent. Event Type Code: 5;"),
            record(4, Priority::Notice, "US profile assignment change;"),
            record(5, Priority::Notice, "Login success from LAN interface"),
        ];
        let summary = engine().analyze(&records);

        assert_eq!(summary.warnings.total, 3);
        assert_eq!(summary.warnings.mdd_timeouts, 1);
        assert_eq!(summary.warnings.dbc_mismatches, 1);
        assert_eq!(summary.notices.total, 3);
        assert_eq!(summary.notices.cm_status, 1);
        assert_eq!(summary.notices.profile_changes, 1);
        assert_eq!(summary.notices.logins, 1);
    }

    #[test]
    fn test_date_range_ignores_sentinel_times() {
        let records = vec![
            record(1000, Priority::Notice, "Login"),
            EventRecord::new(EventRecord::sentinel_time(), Priority::Unknown, "garbage"),
            record(2000, Priority::Notice, "Login again"),
        ];
        let summary = engine().analyze(&records);

        let range = summary.date_range.unwrap();
        assert_eq!(range.start, Utc.timestamp_opt(1000, 0).unwrap());
        assert_eq!(range.end, Utc.timestamp_opt(2000, 0).unwrap());
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let records = vec![
            record(0, Priority::Critical, "T3 time-out on upstream channel 1;"),
            record(400, Priority::Critical, "T3 time-out on upstream channel 2;"),
            record(500, Priority::Warning, "MDD message timeout;"),
        ];
        let engine = engine();
        assert_eq!(engine.analyze(&records), engine.analyze(&records));
    }
}
