//! Outage-period detection
//!
//! Critical events are sorted by time (stable sort, ties keep arrival order)
//! and scanned once left to right: an event joins the running cluster when it
//! falls within the gap threshold of the cluster's last event, otherwise the
//! cluster closes and a new one opens. A cluster of one is still an outage,
//! with zero duration.

use crate::event::EventRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous cluster of critical events treated as one incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutagePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_secs: i64,
    pub event_count: usize,
}

impl OutagePeriod {
    fn from_cluster(start: DateTime<Utc>, end: DateTime<Utc>, event_count: usize) -> Self {
        Self {
            start,
            end,
            duration_secs: (end - start).num_seconds(),
            event_count,
        }
    }
}

/// Cluster critical events into outage periods
///
/// Single left-to-right greedy pass over the time-sorted events; O(n log n)
/// dominated by the sort.
pub fn detect_outages<'a, I>(criticals: I, gap: Duration) -> Vec<OutagePeriod>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut sorted: Vec<&EventRecord> = criticals.into_iter().collect();
    sorted.sort_by_key(|record| record.time);

    let mut outages = Vec::new();
    let mut cluster: Option<(DateTime<Utc>, DateTime<Utc>, usize)> = None;

    for record in sorted {
        cluster = match cluster {
            Some((start, last, count)) if record.time - last <= gap => {
                Some((start, record.time, count + 1))
            }
            Some((start, last, count)) => {
                outages.push(OutagePeriod::from_cluster(start, last, count));
                Some((record.time, record.time, 1))
            }
            None => Some((record.time, record.time, 1)),
        };
    }

    if let Some((start, last, count)) = cluster {
        outages.push(OutagePeriod::from_cluster(start, last, count));
    }

    outages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Priority;
    use chrono::{TimeZone, Utc};

    fn critical_at(secs: i64) -> EventRecord {
        EventRecord::new(
            Utc.timestamp_opt(secs, 0).unwrap(),
            Priority::Critical,
            "T3 time-out",
        )
    }

    #[test]
    fn test_empty_input_yields_no_outages() {
        assert!(detect_outages(&[], Duration::minutes(5)).is_empty());
    }

    #[test]
    fn test_single_event_is_zero_duration_outage() {
        let events = vec![critical_at(1000)];
        let outages = detect_outages(&events, Duration::minutes(5));
        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].duration_secs, 0);
        assert_eq!(outages[0].event_count, 1);
        assert_eq!(outages[0].start, outages[0].end);
    }

    #[test]
    fn test_gap_threshold_splits_clusters() {
        // T, T+1min, T+10min with a 5-minute gap: two periods
        let events = vec![critical_at(0), critical_at(60), critical_at(600)];
        let outages = detect_outages(&events, Duration::minutes(5));

        assert_eq!(outages.len(), 2);
        assert_eq!(outages[0].event_count, 2);
        assert_eq!(outages[0].duration_secs, 60);
        assert_eq!(outages[1].event_count, 1);
        assert_eq!(outages[1].duration_secs, 0);
    }

    #[test]
    fn test_out_of_order_arrival_is_sorted_first() {
        let events = vec![critical_at(600), critical_at(0), critical_at(60)];
        let outages = detect_outages(&events, Duration::minutes(5));

        assert_eq!(outages.len(), 2);
        assert_eq!(outages[0].start, Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(outages[0].end, Utc.timestamp_opt(60, 0).unwrap());
    }

    #[test]
    fn test_boundary_gap_joins_cluster() {
        // Exactly at the threshold still joins
        let events = vec![critical_at(0), critical_at(300)];
        let outages = detect_outages(&events, Duration::minutes(5));
        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].event_count, 2);
    }

    #[test]
    fn test_chain_extends_cluster_beyond_gap_from_start() {
        // Each step is within the gap of the previous event, so one long
        // cluster forms even though the last event is far from the first.
        let events = vec![
            critical_at(0),
            critical_at(240),
            critical_at(480),
            critical_at(720),
        ];
        let outages = detect_outages(&events, Duration::minutes(5));
        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].event_count, 4);
        assert_eq!(outages[0].duration_secs, 720);
    }
}
