use crate::core::checker::{CorrectnessChecker, DEFAULT_MAX_REASONABLE_HOURS};
use crate::core::client::{ApiSettings, Credentials};
use crate::domain::report::ReportNaming;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Upper bound of `checks.overlap_tolerance_seconds`, one day.
const MAX_OVERLAP_TOLERANCE_SECONDS: u64 = 86_400;

pub const DEFAULT_BASE_URL: &str = "https://api.track.toggl.com";
pub const DEFAULT_INVOICE_URL: &str =
    "https://docs.google.com/spreadsheets/d/{spreadsheet_id}/export?format=xlsx";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub account: AccountConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub invoice: InvoiceConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub workspace_id: String,
    pub api_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub company: String,
    pub handle: String,
    #[serde(default = "default_directory")]
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceConfig {
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_invoice_url")]
    pub export_url: String,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            export_url: default_invoice_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_reasonable_hours")]
    pub max_reasonable_hours: f64,
    #[serde(default)]
    pub overlap_tolerance_seconds: u64,
    #[serde(default)]
    pub export_csv: bool,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_reasonable_hours: DEFAULT_MAX_REASONABLE_HOURS,
            overlap_tolerance_seconds: 0,
            export_csv: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_pages() -> u64 {
    50
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_invoice_url() -> String {
    DEFAULT_INVOICE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_reasonable_hours() -> f64 {
    DEFAULT_MAX_REASONABLE_HOURS
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written
    /// and are reported by validation.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("account.workspace_id", &self.account.workspace_id)?;
        validate_resolved("account.workspace_id", &self.account.workspace_id)?;
        self.credentials()?;

        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;
        validation::validate_positive_number("api.max_pages", self.api.max_pages, 1)?;

        validation::validate_file_name_part("output.company", &self.output.company)?;
        validation::validate_file_name_part("output.handle", &self.output.handle)?;
        validation::validate_path("output.directory", &self.output.directory)?;

        if let Some(invoice_url) = self.invoice_url() {
            validate_resolved("invoice.spreadsheet_id", &invoice_url)?;
            validation::validate_url("invoice.export_url", &invoice_url)?;
        }

        validation::validate_range(
            "checks.max_reasonable_hours",
            self.checks.max_reasonable_hours,
            0.5,
            24.0,
        )?;
        validation::validate_range(
            "checks.overlap_tolerance_seconds",
            self.checks.overlap_tolerance_seconds,
            0,
            MAX_OVERLAP_TOLERANCE_SECONDS,
        )?;

        Ok(())
    }

    /// An API token wins over username and password.
    pub fn credentials(&self) -> Result<Credentials> {
        let account = &self.account;

        if let Some(token) = account.api_token.as_deref().filter(|t| !t.trim().is_empty()) {
            validate_resolved("account.api_token", token)?;
            return Ok(Credentials::api_token(token));
        }

        let username = validation::validate_required_field("account.username", &account.username)?;
        let password = validation::validate_required_field("account.password", &account.password)?;
        validation::validate_non_empty_string("account.username", username)?;
        validate_resolved("account.username", username)?;
        validate_resolved("account.password", password)?;

        Ok(Credentials::basic(username, password))
    }

    /// Export URL of the invoice spreadsheet, if one is configured.
    pub fn invoice_url(&self) -> Option<String> {
        self.invoice
            .spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| self.invoice.export_url.replace("{spreadsheet_id}", id))
    }

    pub fn api_settings(&self) -> Result<ApiSettings> {
        Ok(ApiSettings {
            base_url: self.api.base_url.trim_end_matches('/').to_string(),
            workspace_id: self.account.workspace_id.clone(),
            credentials: self.credentials()?,
            timeout: Duration::from_secs(self.api.timeout_seconds),
            max_pages: self.api.max_pages,
            invoice_url: self.invoice_url(),
        })
    }

    pub fn naming(&self) -> ReportNaming {
        ReportNaming::new(&self.output.company, &self.output.handle)
    }

    pub fn checker(&self) -> Result<CorrectnessChecker> {
        let seconds = self.checks.overlap_tolerance_seconds;
        let tolerance = i64::try_from(seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| ReportError::InvalidConfigValueError {
                field: "checks.overlap_tolerance_seconds".to_string(),
                value: seconds.to_string(),
                reason: "Value is out of range".to_string(),
            })?;

        Ok(CorrectnessChecker::new(self.checks.max_reasonable_hours, tolerance))
    }

    pub fn output_path(&self) -> &str {
        &self.output.directory
    }
}

fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if let Some(caps) = env_var_pattern().captures(value) {
        return Err(ReportError::ConfigError {
            message: format!(
                "{} refers to environment variable {} which is not set",
                field_name, &caps[1]
            ),
        });
    }
    Ok(())
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
