use crate::domain::month_range::MonthRange;
use crate::domain::report::{FileExtension, ReportType};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The remote time-tracking service.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Raw records of the detail report, every page of it. Records are not
    /// decoded here, so one odd record cannot fail the request.
    async fn fetch_detail_records(&self, range: &MonthRange) -> Result<Vec<serde_json::Value>>;

    /// A rendered report file; the bytes are opaque.
    async fn fetch_report(
        &self,
        report_type: ReportType,
        extension: FileExtension,
        range: &MonthRange,
    ) -> Result<Vec<u8>>;

    /// The invoice spreadsheet, or `None` when no spreadsheet is configured.
    async fn fetch_invoice(&self) -> Result<Option<Vec<u8>>>;
}
