use crate::domain::month_range::MonthRange;
use crate::domain::ports::ReportSource;
use crate::domain::report::{FileExtension, ReportType};
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

const NEXT_ROW_HEADER: &str = "X-Next-Row-Number";

/// HTTP basic auth pair. An API token is sent as `token:api_token`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn api_token(token: impl Into<String>) -> Self {
        Self::basic(token, "api_token")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"***")
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub workspace_id: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub max_pages: u64,
    pub invoice_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReportQuery {
    start_date: String,
    end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_row_number: Option<u64>,
}

impl ReportQuery {
    fn new(range: &MonthRange, first_row_number: Option<u64>) -> Self {
        Self {
            start_date: range.start(),
            end_date: range.end(),
            first_row_number,
        }
    }
}

/// Client for the Toggl Track reports API (v3).
pub struct TogglClient {
    settings: ApiSettings,
    client: Client,
}

impl TogglClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { settings, client })
    }

    pub fn report_url(&self, report_type: ReportType, extension: FileExtension) -> String {
        format!(
            "{}/reports/api/v3/workspace/{}/{}/time_entries{}",
            self.settings.base_url,
            self.settings.workspace_id,
            report_type.endpoint(),
            extension.suffix()
        )
    }

    async fn post_report(&self, url: &str, query: &ReportQuery) -> Result<Response> {
        tracing::debug!("POST {} ({} to {})", url, query.start_date, query.end_date);
        let response = self
            .client
            .post(url)
            .basic_auth(
                &self.settings.credentials.username,
                Some(&self.settings.credentials.password),
            )
            .json(query)
            .send()
            .await?;

        ensure_success(response)
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("Response status: {}", status);

    if !status.is_success() {
        return Err(ReportError::HttpStatusError {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

fn next_row_number(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(NEXT_ROW_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[async_trait]
impl ReportSource for TogglClient {
    async fn fetch_detail_records(&self, range: &MonthRange) -> Result<Vec<serde_json::Value>> {
        let url = self.report_url(ReportType::Detail, FileExtension::None);
        let mut records = Vec::new();
        let mut first_row_number = None;

        for page in 1..=self.settings.max_pages {
            let response = self
                .post_report(&url, &ReportQuery::new(range, first_row_number))
                .await?;
            first_row_number = next_row_number(&response);

            let body = response.bytes().await?;
            let page_records: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
            tracing::debug!("Detail report page {}: {} records", page, page_records.len());
            records.extend(page_records);

            if first_row_number.is_none() {
                return Ok(records);
            }
        }

        tracing::warn!(
            "Stopped after {} pages of the detail report, later entries were not checked",
            self.settings.max_pages
        );
        Ok(records)
    }

    async fn fetch_report(
        &self,
        report_type: ReportType,
        extension: FileExtension,
        range: &MonthRange,
    ) -> Result<Vec<u8>> {
        let url = self.report_url(report_type, extension);
        let response = self.post_report(&url, &ReportQuery::new(range, None)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_invoice(&self) -> Result<Option<Vec<u8>>> {
        let Some(url) = self.settings.invoice_url.as_deref() else {
            return Ok(None);
        };

        tracing::debug!("GET {}", url);
        let response = ensure_success(self.client.get(url).send().await?)?;
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ApiSettings {
        ApiSettings {
            base_url: "https://api.track.toggl.com".to_string(),
            workspace_id: "123456".to_string(),
            credentials: Credentials::api_token("secret"),
            timeout: Duration::from_secs(5),
            max_pages: 3,
            invoice_url: None,
        }
    }

    #[test]
    fn test_report_urls() {
        let client = TogglClient::new(settings()).unwrap();

        assert_eq!(
            client.report_url(ReportType::Detail, FileExtension::None),
            "https://api.track.toggl.com/reports/api/v3/workspace/123456/search/time_entries"
        );
        assert_eq!(
            client.report_url(ReportType::Summary, FileExtension::Pdf),
            "https://api.track.toggl.com/reports/api/v3/workspace/123456/summary/time_entries.pdf"
        );
        assert_eq!(
            client.report_url(ReportType::Detail, FileExtension::Csv),
            "https://api.track.toggl.com/reports/api/v3/workspace/123456/search/time_entries.csv"
        );
    }

    #[test]
    fn test_query_body() {
        let range = MonthRange::new(10, 2023).unwrap();

        let first = serde_json::to_value(ReportQuery::new(&range, None)).unwrap();
        assert_eq!(
            first,
            serde_json::json!({"start_date": "2023-10-01", "end_date": "2023-10-31"})
        );

        let next = serde_json::to_value(ReportQuery::new(&range, Some(51))).unwrap();
        assert_eq!(next["first_row_number"], 51);
    }

    #[test]
    fn test_credentials_are_not_printed() {
        let printed = format!("{:?}", settings());
        assert!(!printed.contains("secret"));
    }

    #[tokio::test]
    async fn test_no_invoice_without_spreadsheet() {
        let client = TogglClient::new(settings()).unwrap();
        assert!(client.fetch_invoice().await.unwrap().is_none());
    }
}
