//! Report rendering and structured export
//!
//! The text rendering follows a fixed section order and degrades cleanly to
//! an all-zero summary. The JSON export serializes every summary field and
//! is a strict superset of what the text report shows.

use crate::analysis::AnalysisSummary;
use crate::error::{HubwatchError, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the summary as a fixed-order text report
pub fn render_text(summary: &AnalysisSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Gateway Event Log Analysis");
    let _ = writeln!(out, "==========================");

    let _ = writeln!(out, "\nOverview");
    let _ = writeln!(out, "  Total events: {}", summary.total_events);
    match &summary.date_range {
        Some(range) => {
            let _ = writeln!(
                out,
                "  Date range: {} to {}",
                range.start.format(TIME_FORMAT),
                range.end.format(TIME_FORMAT)
            );
        }
        None => {
            let _ = writeln!(out, "  Date range: n/a");
        }
    }

    let _ = writeln!(out, "\nPriority breakdown");
    for entry in &summary.priority_breakdown {
        let _ = writeln!(
            out,
            "  {:<10} {:>6} ({:5.1}%)",
            entry.priority, entry.count, entry.percent
        );
    }

    let _ = writeln!(out, "\nCritical issues");
    let _ = writeln!(out, "  Total critical events: {}", summary.critical.total);
    let _ = writeln!(
        out,
        "  T3 timeout starts: {}",
        summary.critical.t3_timeout_starts
    );
    let _ = writeln!(
        out,
        "  Retries exhausted: {}",
        summary.critical.retries_exhausted
    );
    let _ = writeln!(
        out,
        "  16 consecutive timeouts: {}",
        summary.critical.consecutive_timeouts
    );
    let _ = writeln!(out, "  No response events: {}", summary.critical.no_response);
    if !summary.critical.affected_channels.is_empty() {
        let channels: Vec<String> = summary
            .critical
            .affected_channels
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(out, "  Affected upstream channels: {}", channels.join(", "));
    }

    let _ = writeln!(out, "\nUpstream channel failures");
    if summary.channel_failures.is_empty() {
        let _ = writeln!(out, "  none recorded");
    }
    for entry in &summary.channel_failures {
        let _ = writeln!(
            out,
            "  channel {:>2}: {:>3} failure(s)",
            entry.channel, entry.failures
        );
    }

    let _ = writeln!(out, "\nError types");
    if summary.error_types.is_empty() {
        let _ = writeln!(out, "  none recorded");
    }
    for entry in &summary.error_types {
        let _ = writeln!(out, "  - {}: {}", entry.message_type, entry.count);
    }

    let _ = writeln!(out, "\nWarnings");
    let _ = writeln!(out, "  Total warnings: {}", summary.warnings.total);
    let _ = writeln!(out, "  MDD timeouts: {}", summary.warnings.mdd_timeouts);
    let _ = writeln!(out, "  DBC mismatches: {}", summary.warnings.dbc_mismatches);

    let _ = writeln!(out, "\nOutage periods ({} total)", summary.outages.len());
    for (i, outage) in summary.outages.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} to {}",
            i + 1,
            outage.start.format(TIME_FORMAT),
            outage.end.format(TIME_FORMAT)
        );
        let _ = writeln!(
            out,
            "     Duration: {:.1} min | Events: {}",
            outage.duration_secs as f64 / 60.0,
            outage.event_count
        );
    }

    let _ = writeln!(out, "\nInformational");
    let _ = writeln!(out, "  CM-STATUS messages: {}", summary.notices.cm_status);
    let _ = writeln!(out, "  Profile changes: {}", summary.notices.profile_changes);
    let _ = writeln!(out, "  Login events: {}", summary.notices.logins);

    let _ = writeln!(out, "\nRecommendations");
    if summary.recommendations.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for advice in &summary.recommendations {
        let _ = writeln!(out, "  - {}", advice);
    }

    out
}

/// Export path derived from the analyzed log's path
///
/// `events.log` becomes `events_analysis.json` in the same directory.
pub fn export_path(log_path: &Path) -> PathBuf {
    let stem = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "events".to_string());
    log_path.with_file_name(format!("{stem}_analysis.json"))
}

/// Write the full summary as pretty-printed JSON
pub fn export_json(summary: &AnalysisSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(|e| HubwatchError::Json {
        source: e,
        context: "Failed to serialize analysis summary".to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| HubwatchError::Io {
        source: e,
        context: format!("Failed to write analysis export: {}", path.display()),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisSummary, OutagePeriod, PriorityCount};
    use crate::event::Priority;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_empty_summary_has_all_sections() {
        let text = render_text(&AnalysisSummary::default());

        for section in [
            "Overview",
            "Priority breakdown",
            "Critical issues",
            "Upstream channel failures",
            "Error types",
            "Warnings",
            "Outage periods",
            "Informational",
            "Recommendations",
        ] {
            assert!(text.contains(section), "missing section: {section}");
        }
        assert!(text.contains("Total events: 0"));
        assert!(text.contains("Date range: n/a"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn test_render_shows_outages_and_recommendations() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let summary = AnalysisSummary {
            total_events: 2,
            priority_breakdown: vec![PriorityCount {
                priority: Priority::Critical,
                count: 2,
                percent: 100.0,
            }],
            outages: vec![OutagePeriod {
                start,
                end: start + chrono::Duration::seconds(60),
                duration_secs: 60,
                event_count: 2,
            }],
            recommendations: vec!["do something".to_string()],
            ..AnalysisSummary::default()
        };

        let text = render_text(&summary);
        assert!(text.contains("Outage periods (1 total)"));
        assert!(text.contains("Duration: 1.0 min | Events: 2"));
        assert!(text.contains("- do something"));
    }

    #[test]
    fn test_export_path_naming() {
        assert_eq!(
            export_path(Path::new("/var/log/events.log")),
            PathBuf::from("/var/log/events_analysis.json")
        );
        assert_eq!(
            export_path(Path::new("events.log")),
            PathBuf::from("events_analysis.json")
        );
    }

    #[test]
    fn test_export_json_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let summary = AnalysisSummary {
            total_events: 3,
            ..AnalysisSummary::default()
        };

        export_json(&summary, &path).unwrap();
        let restored: AnalysisSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, summary);
    }
}
