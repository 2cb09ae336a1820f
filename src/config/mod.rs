pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::month_range::MonthRange;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "toggl-reports")]
#[command(about = "Downloads your monthly Toggl reports")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "toggl.toml")]
    pub config: String,

    /// Month as integer number, default: previous month
    #[arg(long, value_name = "M", allow_negative_numbers = true)]
    pub month: Option<i32>,

    /// Year in yyyy format, default: year of the previous month
    #[arg(long, value_name = "Y", allow_negative_numbers = true)]
    pub year: Option<i32>,

    /// Any day of the month to download, as YYYY-MM-DD
    #[arg(long, conflicts_with_all = ["month", "year"])]
    pub date: Option<NaiveDate>,

    /// Override output.directory from the config file
    #[arg(long)]
    pub output: Option<String>,

    /// Only run the correctness checks, download nothing
    #[arg(long)]
    pub check_only: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn month_range(&self) -> Result<MonthRange> {
        match self.date {
            Some(date) => MonthRange::containing(date),
            None => MonthRange::resolve(self.month, self.year),
        }
    }
}
