use crate::domain::model::TimeEntry;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    EmptyDescription,
    EmptyProject,
    ExcessiveDuration,
    Overlap,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::EmptyProject => "empty_project",
            Self::ExcessiveDuration => "excessive_duration",
            Self::Overlap => "overlap",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Identifies the entry a finding is about, at the timestamp that matters for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryRef {
    pub project_id: Option<u64>,
    pub description: String,
    pub at: DateTime<FixedOffset>,
}

impl EntryRef {
    pub fn at_start(entry: &TimeEntry) -> Self {
        Self {
            project_id: entry.project_id(),
            description: entry.description().to_string(),
            at: entry.start(),
        }
    }

    pub fn at_stop(entry: &TimeEntry) -> Self {
        Self {
            project_id: entry.project_id(),
            description: entry.description().to_string(),
            at: entry.stop(),
        }
    }
}

/// A detected data-entry anomaly. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub entries: Vec<EntryRef>,
    pub message: String,
}

impl Finding {
    pub fn warning(kind: FindingKind, entries: Vec<EntryRef>, message: String) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            entries,
            message,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
