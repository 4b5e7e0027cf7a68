use chrono::NaiveDate;

use crate::consts::{MAX_MONTH, MAX_YEAR, MIN_YEAR};
use crate::prelude::*;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ConfigError {
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid week count {weeks} at pattern position {position} (must be positive)")]
    InvalidWeekCount { position: usize, weeks: u8 },
    #[display(fmt = "Invalid quarter length: {weeks} weeks (must be 13)")]
    InvalidQuarterLength { weeks: u32 },
    #[display(fmt = "Invalid weekday: {_0}")]
    InvalidWeekday(String),
    #[display(fmt = "Invalid format: {_0}")]
    InvalidFormat(String),
}

impl std::error::Error for ConfigError {}

/// Error type for fiscal calendar operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The calendar configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fiscal month index outside `1..=12`.
    #[error("Invalid fiscal month: {0} (must be 1-12)")]
    InvalidPeriod(u8),

    /// Fiscal quarter index outside `1..=4`.
    #[error("Invalid fiscal quarter: {0} (must be 1-4)")]
    InvalidQuarter(u8),

    /// Span start is after its end.
    #[error("Invalid date span: start ({start}) is after end ({end})")]
    InvalidSpan { start: NaiveDate, end: NaiveDate },

    /// A cycle anchor date could not be represented.
    #[error("Date out of range: {year}-{month:02}")]
    DateOutOfRange { year: i32, month: u8 },
}
