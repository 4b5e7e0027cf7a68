use std::{cmp::Ordering, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CalendarError, ConfigError, SPAN_SEPARATOR, prelude::*};

/// An inclusive range of civil dates.
/// The start date is always less than or equal to the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{start}/{end}")]
pub struct DateSpan {
    start: NaiveDate,
    end:   NaiveDate,
}

impl DateSpan {
    /// Creates a new span with validation.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidSpan` if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Span between dates already known to be ordered
    pub(crate) fn between(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Returns the first day of the span
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the span (inclusive)
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns both ends as a tuple
    pub const fn dates(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// Number of days covered, counting both ends
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Checks if the span contains a given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Checks if this span shares at least one day with another span
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Checks if this span lies completely inside another span
    pub fn is_within(&self, other: &Self) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    /// Checks if `other` starts on the day after this span ends
    pub fn is_followed_by(&self, other: &Self) -> bool {
        self.end.succ_opt() == Some(other.start)
    }

    /// Iterates over every day of the span in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl FromStr for DateSpan {
    type Err = CalendarError;

    /// Parses the ISO 8601 interval form `YYYY-MM-DD/YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let separator_count = trimmed.matches(SPAN_SEPARATOR).count();

        match separator_count {
            0 => Err(ConfigError::InvalidFormat(format!(
                "No span separator found (expected '{SPAN_SEPARATOR}'): {s}"
            ))
            .into()),
            1 => {
                let (start_str, end_str) = trimmed.split_once(SPAN_SEPARATOR).ok_or_else(|| {
                    ConfigError::InvalidFormat(format!(
                        "Separator '{SPAN_SEPARATOR}' not found despite count == 1"
                    ))
                })?;
                let parse = |part: &str| {
                    part.trim()
                        .parse::<NaiveDate>()
                        .map_err(|_| ConfigError::InvalidFormat(part.trim().to_owned()))
                };

                Self::new(parse(start_str)?, parse(end_str)?)
            },
            _ => Err(ConfigError::InvalidFormat(format!(
                "Too many '{SPAN_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))
            .into()),
        }
    }
}

impl PartialOrd for DateSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare start dates first, then end dates
        match self.start.cmp(&other.start) {
            Ordering::Equal => self.end.cmp(&other.end),
            ord => ord,
        }
    }
}

impl Serialize for DateSpan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateSpan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
