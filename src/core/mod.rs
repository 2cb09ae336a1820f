pub mod checker;
pub mod client;
pub mod engine;
pub mod export;

pub use crate::domain::finding::{Finding, FindingKind};
pub use crate::domain::model::TimeEntry;
pub use crate::domain::ports::{ReportSource, Storage};
pub use crate::utils::error::Result;
