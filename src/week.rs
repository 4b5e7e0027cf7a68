use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::consts::DAYS_PER_WEEK;
use crate::{DateSpan, Month};

const WEEK_LENGTH: usize = DAYS_PER_WEEK as usize;

/// One fiscal week: its number within the fiscal year and its seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalWeek {
    number: u32,
    days:   [NaiveDate; WEEK_LENGTH],
}

impl FiscalWeek {
    /// The week numbered `number` whose first day is `first_day`
    pub(crate) fn starting(number: u32, first_day: NaiveDate) -> Self {
        let mut days = [first_day; WEEK_LENGTH];
        for (offset, day) in (0..).zip(days.iter_mut()) {
            *day = first_day + Duration::days(offset);
        }
        Self { number, days }
    }

    /// 1-based week number, continuous across the fiscal year
    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn days(&self) -> &[NaiveDate; WEEK_LENGTH] {
        &self.days
    }

    pub const fn first_day(&self) -> NaiveDate {
        self.days[0]
    }

    pub const fn last_day(&self) -> NaiveDate {
        self.days[WEEK_LENGTH - 1]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day() <= date && date <= self.last_day()
    }

    pub fn span(&self) -> DateSpan {
        DateSpan::between(self.first_day(), self.last_day())
    }
}

impl fmt::Display for FiscalWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{:02} {}", self.number, self.span())
    }
}

/// The weeks of one fiscal month, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalMonth {
    index:           u8,
    gregorian_month: Month,
    weeks:           Vec<FiscalWeek>,
}

impl FiscalMonth {
    pub(crate) const fn new(index: u8, gregorian_month: Month, weeks: Vec<FiscalWeek>) -> Self {
        Self {
            index,
            gregorian_month,
            weeks,
        }
    }

    /// 1-based position of the month in the fiscal year
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// The Gregorian month this fiscal month is named after
    pub const fn gregorian_month(&self) -> Month {
        self.gregorian_month
    }

    pub const fn abbreviation(&self) -> &'static str {
        self.gregorian_month.abbreviation()
    }

    pub fn weeks(&self) -> &[FiscalWeek] {
        &self.weeks
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn span(&self) -> Option<DateSpan> {
        let first = self.weeks.first()?;
        let last = self.weeks.last()?;
        Some(DateSpan::between(first.first_day(), last.last_day()))
    }
}

impl IntoIterator for FiscalMonth {
    type Item = FiscalWeek;
    type IntoIter = std::vec::IntoIter<FiscalWeek>;

    fn into_iter(self) -> Self::IntoIter {
        self.weeks.into_iter()
    }
}
