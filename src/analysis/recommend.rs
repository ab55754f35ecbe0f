//! Recommendation rules
//!
//! An ordered rule table mapping summary conditions to advisory strings.
//! Rules fire independently; output order follows declaration order, and a
//! summary that trips no rule yields an empty list.

use crate::analysis::AnalysisSummary;
use crate::config::AnalysisConfig;
use crate::event::Priority;

/// Evaluate the rule table against a summary
pub fn evaluate(summary: &AnalysisSummary, config: &AnalysisConfig) -> Vec<String> {
    let critical_percent = summary
        .priority_breakdown
        .iter()
        .find(|entry| entry.priority == Priority::Critical)
        .map(|entry| entry.percent)
        .unwrap_or(0.0);

    let rules = [
        (
            critical_percent > config.critical_percent_threshold,
            format!(
                "Critical events make up {:.1}% of the log; severe upstream signal problems are likely. Contact the provider and request upstream signal level testing.",
                critical_percent
            ),
        ),
        (
            summary.outages.len() > config.outage_count_threshold,
            format!(
                "{} distinct outage windows detected; check all coax connections for damage or looseness.",
                summary.outages.len()
            ),
        ),
        (
            summary.warnings.mdd_timeouts > config.mdd_timeout_threshold,
            format!(
                "Frequent MDD timeouts ({}) indicate downstream communication issues.",
                summary.warnings.mdd_timeouts
            ),
        ),
        (
            summary.warnings.dbc_mismatches > config.dbc_mismatch_threshold,
            format!(
                "DBC-REQ mismatches ({}) suggest signal quality problems.",
                summary.warnings.dbc_mismatches
            ),
        ),
    ];

    rules
        .into_iter()
        .filter(|(fires, _)| *fires)
        .map(|(_, advice)| advice)
        .collect()
}
