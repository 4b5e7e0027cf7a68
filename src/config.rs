use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Month, QuarterPattern, Year};

/// Everything a fiscal calendar is derived from.
///
/// Missing fields fall back to [`Default`]: the current year, a February
/// start, Sunday weeks and the 4-5-4 pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalYearConfig {
    pub year:             Year,
    pub start_month:      Month,
    pub starting_weekday: Weekday,
    pub quarter_pattern:  QuarterPattern,
}

impl FiscalYearConfig {
    /// Validates `year` and `start_month`, keeping the other defaults
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidYear` or `ConfigError::InvalidMonth`.
    pub fn new(year: u16, start_month: u8) -> Result<Self, ConfigError> {
        Ok(Self {
            year: Year::new(year)?,
            start_month: Month::new(start_month)?,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn with_starting_weekday(mut self, weekday: Weekday) -> Self {
        self.starting_weekday = weekday;
        self
    }

    #[must_use]
    pub const fn with_quarter_pattern(mut self, pattern: QuarterPattern) -> Self {
        self.quarter_pattern = pattern;
        self
    }
}

impl Default for FiscalYearConfig {
    fn default() -> Self {
        Self {
            year:             Year::current(),
            start_month:      Month::default(),
            starting_weekday: Weekday::Sun,
            quarter_pattern:  QuarterPattern::default(),
        }
    }
}

/// Parses a weekday name such as `sun` or `Sunday`
///
/// # Errors
/// Returns `ConfigError::InvalidWeekday` for anything chrono doesn't recognise.
pub fn parse_weekday(s: &str) -> Result<Weekday, ConfigError> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ConfigError::InvalidWeekday(s.to_owned()))
}
