use crate::domain::finding::Finding;
use crate::utils::error::{ReportError, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FindingRow<'a> {
    kind: &'a str,
    severity: String,
    description: &'a str,
    project_id: Option<u64>,
    at: String,
    message: &'a str,
}

/// Renders findings as CSV, one row per finding, keyed on its first entry.
pub fn findings_to_csv(findings: &[Finding]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for finding in findings {
        let first = finding.entries.first();
        writer.serialize(FindingRow {
            kind: finding.kind.as_str(),
            severity: finding.severity.to_string(),
            description: first.map_or("", |e| e.description.as_str()),
            project_id: first.and_then(|e| e.project_id),
            at: first.map(|e| e.at.to_rfc3339()).unwrap_or_default(),
            message: &finding.message,
        })?;
    }

    writer.into_inner().map_err(|e| ReportError::IoError(e.into_error()))
}
