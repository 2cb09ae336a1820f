use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Remote service returned {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Malformed time entry: {message}")]
    MalformedEntryError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Input,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with this error. Never 0: the
    /// run did not finish.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Low | Self::High => 1,
            Self::Medium => 2,
            Self::Critical => 3,
        }
    }
}

impl ReportError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn malformed_entry(message: impl Into<String>) -> Self {
        Self::MalformedEntryError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::CsvError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::SerializationError(_) | Self::MalformedEntryError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MalformedEntryError { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::HttpStatusError { .. } => ErrorSeverity::Medium,
            Self::ValidationError { .. }
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::SerializationError(_)
            | Self::CsvError(_) => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check your network connection and the configured API base URL",
            Self::HttpStatusError { status: 401 | 403, .. } => {
                "Check the API token or username/password in the [account] section"
            }
            Self::HttpStatusError { .. } => {
                "Check the workspace id and try again once the service is reachable"
            }
            Self::CsvError(_) | Self::IoError(_) => {
                "Make sure the output directory exists and is writable"
            }
            Self::SerializationError(_) | Self::MalformedEntryError { .. } => {
                "Inspect the time entries of this month in the web interface"
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file and run again",
            Self::ValidationError { .. } => "Pass --month between 1 and 12 and --year between 1 and 9999",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } => {
                format!("Could not download report data: {}", self)
            }
            Self::IoError(_) | Self::CsvError(_) => format!("Could not save report: {}", self),
            Self::ValidationError { message } => format!("Invalid month range: {}", message),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
