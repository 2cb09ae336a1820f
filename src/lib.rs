pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::AppConfig;

pub use self::core::checker::CorrectnessChecker;
pub use self::core::client::TogglClient;
pub use self::core::engine::{ReportEngine, RunOptions, RunSummary};
pub use domain::finding::{Finding, FindingKind};
pub use domain::model::TimeEntry;
pub use domain::month_range::MonthRange;
pub use utils::error::{ReportError, Result};
