use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// One tracked interval, normalized from the detail report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntry {
    project_id: Option<u64>,
    description: String,
    start: DateTime<FixedOffset>,
    stop: DateTime<FixedOffset>,
    seconds: u64,
}

impl TimeEntry {
    pub fn new(
        project_id: Option<u64>,
        description: impl Into<String>,
        start: DateTime<FixedOffset>,
        stop: DateTime<FixedOffset>,
        seconds: u64,
    ) -> Result<Self> {
        let description = description.into();
        if stop < start {
            return Err(ReportError::malformed_entry(format!(
                "entry '{}' stops at {} before it starts at {}",
                description, stop, start
            )));
        }

        Ok(Self {
            project_id,
            description,
            start,
            stop,
            seconds,
        })
    }

    /// Builds an entry from its start and duration; the stop is derived.
    pub fn spanning(
        project_id: Option<u64>,
        description: impl Into<String>,
        start: DateTime<FixedOffset>,
        seconds: u64,
    ) -> Result<Self> {
        let stop = i64::try_from(seconds)
            .ok()
            .and_then(|secs| start.checked_add_signed(Duration::seconds(secs)))
            .ok_or_else(|| {
                ReportError::malformed_entry(format!("duration of {}s is out of range", seconds))
            })?;
        Self::new(project_id, description, start, stop, seconds)
    }

    pub fn project_id(&self) -> Option<u64> {
        self.project_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn stop(&self) -> DateTime<FixedOffset> {
        self.stop
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds as i64)
    }

    /// Flattens the grouped detail report into one entry per tracked interval.
    /// Project and description come from the group, timestamps from each interval.
    pub fn from_detail_groups(groups: &[DetailGroup]) -> Result<Vec<Self>> {
        let mut entries = Vec::new();

        for group in groups {
            let description = group.description.clone().unwrap_or_default();
            for raw in &group.time_entries {
                entries.push(raw.to_entry(group.project_id, &description)?);
            }
        }

        Ok(entries)
    }

    /// Decodes raw detail-report records one by one, then flattens them. A record
    /// with the wrong shape is a malformed entry, like a bad timestamp.
    pub fn from_detail_records(records: &[serde_json::Value]) -> Result<Vec<Self>> {
        let groups = records
            .iter()
            .enumerate()
            .map(|(index, record)| DetailGroup::from_record(index, record))
            .collect::<Result<Vec<_>>>()?;
        Self::from_detail_groups(&groups)
    }
}

/// A group of the detail (`search`) report: entries sharing project and description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailGroup {
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_entries: Vec<RawTimeEntry>,
}

impl DetailGroup {
    fn from_record(index: usize, record: &serde_json::Value) -> Result<Self> {
        Self::deserialize(record).map_err(|e| {
            ReportError::malformed_entry(format!("detail record #{} has the wrong shape: {}", index, e))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimeEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub stop: Option<String>,
    #[serde(default)]
    pub seconds: Option<i64>,
}

impl RawTimeEntry {
    fn to_entry(&self, project_id: Option<u64>, description: &str) -> Result<TimeEntry> {
        let start = parse_timestamp(self.start.as_deref(), "start", description)?;
        let stop = parse_timestamp(self.stop.as_deref(), "stop", description)?;

        let seconds = match self.seconds {
            Some(secs) => u64::try_from(secs).map_err(|_| {
                ReportError::malformed_entry(format!(
                    "entry '{}' at {} has negative duration {}s (still running?)",
                    description, start, secs
                ))
            })?,
            None => (stop - start).num_seconds().max(0) as u64,
        };

        TimeEntry::new(project_id, description, start, stop, seconds)
    }
}

fn parse_timestamp(
    value: Option<&str>,
    field: &str,
    description: &str,
) -> Result<DateTime<FixedOffset>> {
    let value = value.ok_or_else(|| {
        ReportError::malformed_entry(format!("entry '{}' has no {} time", description, field))
    })?;

    DateTime::parse_from_rfc3339(value).map_err(|e| {
        ReportError::malformed_entry(format!(
            "entry '{}' has invalid {} time '{}': {}",
            description, field, value, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    #[test]
    fn test_rejects_stop_before_start() {
        let result = TimeEntry::new(
            Some(1),
            "backwards",
            ts("2023-10-02T10:00:00+02:00"),
            ts("2023-10-02T09:00:00+02:00"),
            0,
        );
        assert!(matches!(result, Err(ReportError::MalformedEntryError { .. })));
    }

    #[test]
    fn test_spanning_derives_stop() {
        let entry = TimeEntry::spanning(None, "review", ts("2023-10-02T09:00:00Z"), 5400).unwrap();
        assert_eq!(entry.stop(), ts("2023-10-02T10:30:00Z"));
        assert_eq!(entry.duration(), Duration::minutes(90));
    }

    #[test]
    fn test_from_detail_groups_flattens_entries() {
        let groups: Vec<DetailGroup> = serde_json::from_value(serde_json::json!([
            {
                "project_id": 42,
                "description": "Code review",
                "time_entries": [
                    {"id": 1, "start": "2023-10-02T09:00:00+02:00", "stop": "2023-10-02T10:00:00+02:00", "seconds": 3600},
                    {"id": 2, "start": "2023-10-03T09:00:00+02:00", "stop": "2023-10-03T09:30:00+02:00", "seconds": 1800}
                ]
            },
            {
                "project_id": null,
                "description": "",
                "time_entries": [
                    {"id": 3, "start": "2023-10-04T09:00:00+02:00", "stop": "2023-10-04T09:15:00+02:00"}
                ]
            }
        ]))
        .unwrap();

        let entries = TimeEntry::from_detail_groups(&groups).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].project_id(), Some(42));
        assert_eq!(entries[1].description(), "Code review");
        assert_eq!(entries[1].seconds(), 1800);
        assert_eq!(entries[2].project_id(), None);
        assert_eq!(entries[2].description(), "");
        // missing seconds fall back to stop - start
        assert_eq!(entries[2].seconds(), 900);
    }

    #[test]
    fn test_running_entry_is_malformed() {
        let groups = vec![DetailGroup {
            project_id: Some(1),
            description: Some("still running".to_string()),
            time_entries: vec![RawTimeEntry {
                id: Some(9),
                start: Some("2023-10-02T09:00:00Z".to_string()),
                stop: None,
                seconds: Some(-1696237200),
            }],
        }];

        let err = TimeEntry::from_detail_groups(&groups).unwrap_err();
        assert!(err.to_string().contains("no stop time"));
    }

    #[test]
    fn test_mistyped_record_is_malformed() {
        let records = vec![
            serde_json::json!({
                "project_id": 1,
                "description": "fine",
                "time_entries": [
                    {"start": "2023-10-02T09:00:00Z", "stop": "2023-10-02T10:00:00Z", "seconds": 3600}
                ]
            }),
            serde_json::json!({
                "project_id": "not a number",
                "description": "typo",
                "time_entries": [
                    {"start": "2023-10-02T11:00:00Z", "stop": "2023-10-02T12:00:00Z", "seconds": 3600.5}
                ]
            }),
        ];

        let err = TimeEntry::from_detail_records(&records).unwrap_err();
        assert!(matches!(err, ReportError::MalformedEntryError { .. }));
        assert!(err.to_string().contains("detail record #1"));
    }

    #[test]
    fn test_from_detail_records() {
        let records = vec![serde_json::json!({
            "user_id": 7,
            "project_id": null,
            "description": "Standup",
            "time_entries": [
                {"id": 3, "seconds": 900, "start": "2023-10-02T10:45:00+02:00", "stop": "2023-10-02T11:00:00+02:00"}
            ]
        })];

        let entries = TimeEntry::from_detail_records(&records).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].seconds(), 900);
    }

    #[test]
    fn test_invalid_timestamp_is_malformed() {
        let groups = vec![DetailGroup {
            project_id: Some(1),
            description: Some("typo".to_string()),
            time_entries: vec![RawTimeEntry {
                id: None,
                start: Some("yesterday".to_string()),
                stop: Some("2023-10-02T09:00:00Z".to_string()),
                seconds: Some(60),
            }],
        }];

        assert!(matches!(
            TimeEntry::from_detail_groups(&groups),
            Err(ReportError::MalformedEntryError { .. })
        ));
    }
}
