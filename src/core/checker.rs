//! Correctness checks over a month of time entries.
//!
//! Every check is a pure function from entries to findings. None of them
//! filters or reorders the caller's slice, and none of them can fail: an entry
//! that cannot be checked is rejected earlier, when the report is parsed.

use crate::domain::finding::{EntryRef, Finding, FindingKind};
use crate::domain::model::TimeEntry;
use crate::utils::error::Result;
use chrono::Duration;

pub const SECONDS_IN_HOUR: f64 = 3600.0;
pub const DEFAULT_MAX_REASONABLE_HOURS: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectnessChecker {
    max_reasonable_hours: f64,
    overlap_tolerance: Duration,
}

impl Default for CorrectnessChecker {
    fn default() -> Self {
        Self {
            max_reasonable_hours: DEFAULT_MAX_REASONABLE_HOURS,
            overlap_tolerance: Duration::zero(),
        }
    }
}

impl CorrectnessChecker {
    pub fn new(max_reasonable_hours: f64, overlap_tolerance: Duration) -> Self {
        Self {
            max_reasonable_hours,
            overlap_tolerance,
        }
    }

    pub fn max_reasonable_hours(&self) -> f64 {
        self.max_reasonable_hours
    }

    pub fn overlap_tolerance(&self) -> Duration {
        self.overlap_tolerance
    }

    /// Runs all three checks; an earlier check finding something never skips a later one.
    pub fn check(&self, entries: &[TimeEntry]) -> Vec<Finding> {
        let mut findings = check_if_empty(entries);
        findings.extend(check_reasonable_time(entries, hours_to_duration(self.max_reasonable_hours)));
        findings.extend(check_if_overlapping(entries, self.overlap_tolerance));
        findings
    }

    /// Decodes the raw detail records and checks them. Only decoding can fail.
    pub fn check_detail_records(&self, records: &[serde_json::Value]) -> Result<Vec<Finding>> {
        let entries = TimeEntry::from_detail_records(records)?;
        tracing::debug!("Checking {} time entries", entries.len());
        Ok(self.check(&entries))
    }
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * SECONDS_IN_HOUR * 1000.0).round() as i64)
}

fn project_label(project_id: Option<u64>) -> String {
    project_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

/// Flags a blank description and a missing project separately, so an entry
/// lacking both yields two findings.
pub fn check_if_empty(entries: &[TimeEntry]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for entry in entries {
        if entry.description().trim().is_empty() {
            findings.push(Finding::warning(
                FindingKind::EmptyDescription,
                vec![EntryRef::at_start(entry)],
                format!(
                    "Entry: {} at {} has empty description.",
                    project_label(entry.project_id()),
                    entry.start()
                ),
            ));
        }
        if entry.project_id().is_none() {
            findings.push(Finding::warning(
                FindingKind::EmptyProject,
                vec![EntryRef::at_start(entry)],
                format!(
                    "Entry: {} at {} has empty project.",
                    entry.description(),
                    entry.start()
                ),
            ));
        }
    }

    findings
}

/// Flags entries strictly longer than `limit`. The comparison uses the exact
/// duration; rounding to two decimals is for display only.
pub fn check_reasonable_time(entries: &[TimeEntry], limit: Duration) -> Vec<Finding> {
    entries
        .iter()
        .filter(|entry| entry.duration() > limit)
        .map(|entry| {
            let hours = entry.seconds() as f64 / SECONDS_IN_HOUR;
            Finding::warning(
                FindingKind::ExcessiveDuration,
                vec![EntryRef::at_start(entry)],
                format!(
                    "Entry: {} at {} lasted {:.2}h.",
                    entry.description(),
                    entry.start(),
                    hours
                ),
            )
        })
        .collect()
}

/// Sorts by `(start, stop)` and compares each entry with its direct
/// predecessor only. Touching intervals do not overlap, and overlaps no longer
/// than `tolerance` are ignored.
pub fn check_if_overlapping(entries: &[TimeEntry], tolerance: Duration) -> Vec<Finding> {
    let mut sorted: Vec<&TimeEntry> = entries.iter().collect();
    // description and project only break exact ties, so the output never
    // depends on input order
    sorted.sort_by(|a, b| {
        (a.start(), a.stop(), a.description(), a.project_id()).cmp(&(
            b.start(),
            b.stop(),
            b.description(),
            b.project_id(),
        ))
    });

    sorted
        .windows(2)
        .filter(|pair| pair[1].start() + tolerance < pair[0].stop())
        .map(|pair| {
            let (earlier, later) = (pair[0], pair[1]);
            Finding::warning(
                FindingKind::Overlap,
                vec![EntryRef::at_stop(earlier), EntryRef::at_start(later)],
                format!(
                    "Entries: {} at {}, {} at {} are overlapping.",
                    earlier.description(),
                    earlier.stop(),
                    later.description(),
                    later.start()
                ),
            )
        })
        .collect()
}

/// Emits one warning per finding.
pub fn log_findings(findings: &[Finding]) {
    for finding in findings {
        tracing::warn!(kind = %finding.kind, "{}", finding.message);
    }
}
