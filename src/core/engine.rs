use crate::core::checker::{log_findings, CorrectnessChecker};
use crate::core::export::findings_to_csv;
use crate::domain::finding::Finding;
use crate::domain::month_range::MonthRange;
use crate::domain::ports::{ReportSource, Storage};
use crate::domain::report::{default_plan, PlannedReport, ReportNaming, ReportType};
use crate::utils::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub check: bool,
    pub export_findings: bool,
    pub download: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            check: true,
            export_findings: false,
            download: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub findings: Vec<Finding>,
    pub saved_paths: Vec<String>,
}

/// Checks a month of entries, then downloads and saves its reports.
pub struct ReportEngine<R: ReportSource, S: Storage> {
    source: R,
    storage: S,
    naming: ReportNaming,
    checker: CorrectnessChecker,
    options: RunOptions,
}

impl<R: ReportSource, S: Storage> ReportEngine<R, S> {
    pub fn new(source: R, storage: S, naming: ReportNaming, checker: CorrectnessChecker) -> Self {
        Self {
            source,
            storage,
            naming,
            checker,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Findings never stop the run. Only a failed request or write does.
    pub async fn run(&self, range: &MonthRange) -> Result<RunSummary> {
        tracing::info!("Processing reports for {}", range);
        let mut summary = RunSummary::default();

        if self.options.check {
            summary.findings = self.check_correctness(range).await?;

            if self.options.export_findings && !summary.findings.is_empty() {
                let path = self.naming.findings_path(range);
                let data = findings_to_csv(&summary.findings)?;
                self.storage.write_file(&path, &data).await?;
                tracing::info!("Findings written to {}", path);
                summary.saved_paths.push(path);
            }
        }

        if self.options.download {
            for report in default_plan() {
                if let Some(path) = self.download(report, range).await? {
                    summary.saved_paths.push(path);
                }
            }
        }

        Ok(summary)
    }

    /// A detail report that cannot be parsed is logged once and skipped; the
    /// downloads still run. A failed request stays fatal.
    pub async fn check_correctness(&self, range: &MonthRange) -> Result<Vec<Finding>> {
        let checked = match self.source.fetch_detail_records(range).await {
            Ok(records) => self.checker.check_detail_records(&records),
            Err(e @ ReportError::SerializationError(_)) => Err(e),
            Err(e) => return Err(e),
        };

        match checked {
            Ok(findings) => {
                log_findings(&findings);
                if findings.is_empty() {
                    tracing::info!("No problems found in the time entries");
                } else {
                    tracing::info!("{} problem(s) found in the time entries", findings.len());
                }
                Ok(findings)
            }
            Err(e) => {
                tracing::warn!("Raised error {} while checking for correctness.", e);
                Ok(Vec::new())
            }
        }
    }

    async fn download(&self, report: PlannedReport, range: &MonthRange) -> Result<Option<String>> {
        let data = match report.report_type {
            ReportType::Invoice => match self.source.fetch_invoice().await? {
                Some(data) => data,
                None => {
                    tracing::debug!("No invoice spreadsheet configured, skipping {}", report);
                    return Ok(None);
                }
            },
            report_type => {
                self.source
                    .fetch_report(report_type, report.extension, range)
                    .await?
            }
        };

        let path = self.naming.report_path(report, range);
        self.storage.write_file(&path, &data).await?;
        tracing::info!("Saved {} ({} bytes)", path, data.len());
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DetailGroup, RawTimeEntry};
    use crate::domain::report::FileExtension;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockSource {
        records: Vec<serde_json::Value>,
        detail_error: Option<fn() -> ReportError>,
        invoice: Option<Vec<u8>>,
        fail_reports: bool,
    }

    #[async_trait]
    impl ReportSource for MockSource {
        async fn fetch_detail_records(&self, _range: &MonthRange) -> Result<Vec<serde_json::Value>> {
            match self.detail_error {
                Some(error) => Err(error()),
                None => Ok(self.records.clone()),
            }
        }

        async fn fetch_report(
            &self,
            report_type: ReportType,
            extension: FileExtension,
            _range: &MonthRange,
        ) -> Result<Vec<u8>> {
            if self.fail_reports {
                return Err(ReportError::HttpStatusError {
                    status: 500,
                    url: "mock".to_string(),
                });
            }
            Ok(format!("{}{}", report_type.endpoint(), extension.suffix()).into_bytes())
        }

        async fn fetch_invoice(&self) -> Result<Option<Vec<u8>>> {
            Ok(self.invoice.clone())
        }
    }

    fn group(
        project_id: Option<u64>,
        description: &str,
        start: &str,
        stop: Option<&str>,
        seconds: i64,
    ) -> serde_json::Value {
        serde_json::to_value(DetailGroup {
            project_id,
            description: Some(description.to_string()),
            time_entries: vec![RawTimeEntry {
                id: None,
                start: Some(start.to_string()),
                stop: stop.map(str::to_string),
                seconds: Some(seconds),
            }],
        })
        .unwrap()
    }

    fn engine(source: MockSource, storage: MockStorage) -> ReportEngine<MockSource, MockStorage> {
        ReportEngine::new(
            source,
            storage,
            ReportNaming::new("acme", "jdoe"),
            CorrectnessChecker::default(),
        )
    }

    #[tokio::test]
    async fn test_run_checks_and_downloads() {
        let storage = MockStorage::new();
        let source = MockSource {
            records: vec![group(
                None,
                "",
                "2023-10-02T09:00:00Z",
                Some("2023-10-02T10:00:00Z"),
                3600,
            )],
            detail_error: None,
            invoice: Some(b"xlsx".to_vec()),
            fail_reports: false,
        };
        let range = MonthRange::new(10, 2023).unwrap();

        let summary = engine(source, storage.clone()).run(&range).await.unwrap();

        assert_eq!(summary.findings.len(), 2);
        assert_eq!(summary.saved_paths.len(), 4);
        assert_eq!(
            storage
                .get_file("reports/10.2023/acme_jdoe_summary_report_2023-10-01_to_2023-10-31.pdf")
                .await
                .unwrap(),
            b"summary.pdf"
        );
        assert_eq!(
            storage
                .get_file("reports/10.2023/acme_jdoe_invoice_2023-10-01_to_2023-10-31.xlsx")
                .await
                .unwrap(),
            b"xlsx"
        );
    }

    #[tokio::test]
    async fn test_malformed_entries_do_not_stop_downloads() {
        let storage = MockStorage::new();
        let source = MockSource {
            records: vec![group(Some(1), "running", "2023-10-02T09:00:00Z", None, -1)],
            detail_error: None,
            invoice: None,
            fail_reports: false,
        };
        let range = MonthRange::new(10, 2023).unwrap();

        let summary = engine(source, storage).run(&range).await.unwrap();

        assert!(summary.findings.is_empty());
        assert_eq!(summary.saved_paths.len(), 3);
    }

    #[tokio::test]
    async fn test_download_failure_is_fatal() {
        let source = MockSource {
            records: Vec::new(),
            detail_error: None,
            invoice: None,
            fail_reports: true,
        };
        let range = MonthRange::new(10, 2023).unwrap();

        let result = engine(source, MockStorage::new()).run(&range).await;

        assert!(matches!(result, Err(ReportError::HttpStatusError { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_check_only_exports_findings() {
        let storage = MockStorage::new();
        let source = MockSource {
            records: vec![group(
                Some(1),
                "marathon",
                "2023-10-02T06:00:00Z",
                Some("2023-10-02T17:00:00Z"),
                11 * 3600,
            )],
            detail_error: None,
            invoice: None,
            fail_reports: true,
        };
        let range = MonthRange::new(10, 2023).unwrap();
        let options = RunOptions {
            check: true,
            export_findings: true,
            download: false,
        };

        let summary = engine(source, storage.clone())
            .with_options(options)
            .run(&range)
            .await
            .unwrap();

        assert_eq!(
            summary.saved_paths,
            vec!["reports/10.2023/acme_jdoe_findings_2023-10-01_to_2023-10-31.csv".to_string()]
        );
        let csv = storage.get_file(&summary.saved_paths[0]).await.unwrap();
        assert!(String::from_utf8(csv).unwrap().contains("lasted 11.00h."));
    }

    #[tokio::test]
    async fn test_mistyped_record_does_not_stop_downloads() {
        let storage = MockStorage::new();
        let source = MockSource {
            records: vec![serde_json::json!({
                "project_id": "1",
                "description": "typo",
                "time_entries": [
                    {"start": "2023-10-02T09:00:00Z", "stop": "2023-10-02T10:00:00Z", "seconds": 3600.5}
                ]
            })],
            detail_error: None,
            invoice: None,
            fail_reports: false,
        };
        let range = MonthRange::new(10, 2023).unwrap();

        let summary = engine(source, storage).run(&range).await.unwrap();

        assert!(summary.findings.is_empty());
        assert_eq!(summary.saved_paths.len(), 3);
    }

    #[tokio::test]
    async fn test_unparsable_detail_body_does_not_stop_downloads() {
        let source = MockSource {
            records: Vec::new(),
            detail_error: Some(|| {
                ReportError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
            }),
            invoice: None,
            fail_reports: false,
        };
        let range = MonthRange::new(10, 2023).unwrap();

        let summary = engine(source, MockStorage::new()).run(&range).await.unwrap();

        assert!(summary.findings.is_empty());
        assert_eq!(summary.saved_paths.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_detail_request_is_fatal() {
        let source = MockSource {
            records: Vec::new(),
            detail_error: Some(|| ReportError::HttpStatusError {
                status: 403,
                url: "mock".to_string(),
            }),
            invoice: None,
            fail_reports: false,
        };
        let range = MonthRange::new(10, 2023).unwrap();

        let result = engine(source, MockStorage::new()).run(&range).await;

        assert!(matches!(result, Err(ReportError::HttpStatusError { status: 403, .. })));
    }
}
