use crate::domain::month_range::MonthRange;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    Summary,
    Detail,
    Invoice,
}

impl ReportType {
    /// Path segment of the reports API.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detail => "search",
            Self::Invoice => "invoice",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Summary => "summary_report",
            Self::Detail => "time_entries",
            Self::Invoice => "invoice",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileExtension {
    Csv,
    Pdf,
    Xlsx,
    None,
}

impl FileExtension {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Pdf => ".pdf",
            Self::Xlsx => ".xlsx",
            Self::None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedReport {
    pub report_type: ReportType,
    pub extension: FileExtension,
}

impl PlannedReport {
    pub const fn new(report_type: ReportType, extension: FileExtension) -> Self {
        Self {
            report_type,
            extension,
        }
    }
}

impl fmt::Display for PlannedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.report_type.file_stem(), self.extension.suffix())
    }
}

/// Summary PDF, detail PDF, detail CSV and the invoice spreadsheet. The invoice
/// is skipped at download time when no spreadsheet is set up.
pub fn default_plan() -> Vec<PlannedReport> {
    vec![
        PlannedReport::new(ReportType::Summary, FileExtension::Pdf),
        PlannedReport::new(ReportType::Detail, FileExtension::Pdf),
        PlannedReport::new(ReportType::Detail, FileExtension::Csv),
        PlannedReport::new(ReportType::Invoice, FileExtension::Xlsx),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNaming {
    pub company: String,
    pub handle: String,
}

impl ReportNaming {
    pub fn new(company: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            handle: handle.into(),
        }
    }

    pub fn directory(&self, range: &MonthRange) -> String {
        format!("reports/{}.{}", range.month(), range.year())
    }

    pub fn report_path(&self, report: PlannedReport, range: &MonthRange) -> String {
        self.path_for(report.report_type.file_stem(), report.extension.suffix(), range)
    }

    pub fn findings_path(&self, range: &MonthRange) -> String {
        self.path_for("findings", ".csv", range)
    }

    fn path_for(&self, stem: &str, suffix: &str, range: &MonthRange) -> String {
        format!(
            "{}/{}_{}_{}_{}_to_{}{}",
            self.directory(range),
            self.company,
            self.handle,
            stem,
            range.start(),
            range.end(),
            suffix
        )
    }
}
