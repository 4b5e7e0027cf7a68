use crate::consts::{
    DEFAULT_QUARTER_PATTERN, DEFAULT_START_MONTH, MAX_MONTH, MAX_YEAR, MIN_YEAR, MONTH_ABBREVIATIONS,
    MONTHS_PER_QUARTER, MONTHS_PER_YEAR, PATTERN_SEPARATORS, QUARTERS_PER_YEAR,
};
use crate::ConfigError;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;
use std::num::NonZeroU8;
use std::str::FromStr;

/// Weeks in one quarter of any valid pattern
const WEEKS_PER_QUARTER: u32 = 13;

/// A year value guaranteed to be in the range `MIN_YEAR..=MAX_YEAR` (1..=9999)
/// Uses `NonZeroU16` internally, so 0 is not a valid year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Year(NonZeroU16);

impl Year {
    /// Latest representable year
    pub const MAX: Self = match NonZeroU16::new(MAX_YEAR) {
        Some(value) => Self(value),
        None => unreachable!(),
    };

    /// Creates a new Year, validating that it's non-zero and <= `MAX_YEAR`
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidYear` if the value is 0 or > `MAX_YEAR`.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        let non_zero = NonZeroU16::new(value).ok_or(ConfigError::InvalidYear(value))?;
        if value > MAX_YEAR {
            return Err(ConfigError::InvalidYear(value));
        }
        Ok(Self(non_zero))
    }

    /// The current year on the local clock, clamped to the valid range
    pub fn current() -> Self {
        let year = chrono::Local::now().year().clamp(i32::from(MIN_YEAR), i32::from(MAX_YEAR));
        u16::try_from(year)
            .ok()
            .and_then(|value| Self::new(value).ok())
            .unwrap_or(Self::MAX)
    }

    /// Returns the year value as u16
    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    /// Returns the year in the signed form chrono works with
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self.0.get() as i32
    }
}

impl TryFrom<u16> for Year {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.0.get()
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A Gregorian month guaranteed to be in the range `1..=MAX_MONTH` (1..=12)
/// Uses `NonZeroU8` internally, so 0 is not a valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(NonZeroU8);

impl Month {
    /// Creates a new Month, validating that it's non-zero and <= `MAX_MONTH`
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidMonth` if the value is 0 or > `MAX_MONTH`.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        let non_zero = NonZeroU8::new(value).ok_or(ConfigError::InvalidMonth(value))?;
        if value > MAX_MONTH {
            return Err(ConfigError::InvalidMonth(value));
        }
        Ok(Self(non_zero))
    }

    /// Returns the month value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Month number in the form chrono works with
    #[inline]
    pub fn number(self) -> u32 {
        u32::from(self.0.get())
    }

    /// Three-letter English abbreviation
    pub const fn abbreviation(self) -> &'static str {
        MONTH_ABBREVIATIONS[(self.0.get() - 1) as usize]
    }

    /// The month `offset` months after this one, wrapping past December
    pub fn wrapping_add(self, offset: usize) -> Self {
        let zero_based = (usize::from(self.0.get() - 1) + offset) % usize::from(MAX_MONTH);
        // zero_based < 12, so the result stays within 1..=12
        match u8::try_from(zero_based + 1).ok().and_then(NonZeroU8::new) {
            Some(value) => Self(value),
            None => self,
        }
    }
}

impl Default for Month {
    fn default() -> Self {
        match NonZeroU8::new(DEFAULT_START_MONTH) {
            Some(value) => Self(value),
            None => unreachable!(),
        }
    }
}

impl TryFrom<u8> for Month {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Weeks per fiscal month within a quarter, e.g. `4-5-4`.
/// Every entry is positive and the three entries add up to 13 weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 3]", into = "[u8; 3]")]
pub struct QuarterPattern([u8; MONTHS_PER_QUARTER]);

impl QuarterPattern {
    /// The NRF 4-5-4 pattern
    pub const NRF: Self = Self(DEFAULT_QUARTER_PATTERN);

    /// Creates a quarter pattern, validating each entry and the quarter length
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidWeekCount` for a zero entry and
    /// `ConfigError::InvalidQuarterLength` if the weeks don't add up to 13.
    pub fn new(weeks: [u8; MONTHS_PER_QUARTER]) -> Result<Self, ConfigError> {
        if let Some((index, &count)) = weeks.iter().enumerate().find(|(_, w)| **w == 0) {
            return Err(ConfigError::InvalidWeekCount {
                position: index + 1,
                weeks:    count,
            });
        }
        let total: u32 = weeks.iter().copied().map(u32::from).sum();
        if total != WEEKS_PER_QUARTER {
            return Err(ConfigError::InvalidQuarterLength { weeks: total });
        }
        Ok(Self(weeks))
    }

    /// Returns the three week counts
    #[inline]
    pub const fn weeks(self) -> [u8; MONTHS_PER_QUARTER] {
        self.0
    }
}

impl Default for QuarterPattern {
    fn default() -> Self {
        Self::NRF
    }
}

impl TryFrom<[u8; MONTHS_PER_QUARTER]> for QuarterPattern {
    type Error = ConfigError;

    fn try_from(value: [u8; MONTHS_PER_QUARTER]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuarterPattern> for [u8; MONTHS_PER_QUARTER] {
    fn from(pattern: QuarterPattern) -> Self {
        pattern.0
    }
}

impl fmt::Display for QuarterPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}-{b}-{c}")
    }
}

impl FromStr for QuarterPattern {
    type Err = ConfigError;

    /// Parses `4-5-4` or `4,5,4`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(PATTERN_SEPARATORS).map(str::trim).collect();
        let [a, b, c] = parts.as_slice() else {
            return Err(ConfigError::InvalidFormat(format!(
                "expected three week counts, found {}",
                parts.len()
            )));
        };
        let parse = |part: &str| {
            part.parse::<u8>()
                .map_err(|_| ConfigError::InvalidFormat(part.to_owned()))
        };
        Self::new([parse(*a)?, parse(*b)?, parse(*c)?])
    }
}

/// Weeks per fiscal month for a whole year: the quarter pattern repeated four
/// times, with the last month absorbing the 53rd week when there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekPattern([u8; MONTHS_PER_YEAR]);

impl WeekPattern {
    pub fn new(quarter: QuarterPattern, extra_week: bool) -> Self {
        let quarter_weeks = quarter.weeks();
        let mut weeks = [0; MONTHS_PER_YEAR];
        for (slot, count) in weeks
            .iter_mut()
            .zip(quarter_weeks.iter().cycle().take(MONTHS_PER_QUARTER * QUARTERS_PER_YEAR))
        {
            *slot = *count;
        }
        if extra_week {
            weeks[MONTHS_PER_YEAR - 1] += 1;
        }
        Self(weeks)
    }

    /// Week counts for fiscal months 1 through 12
    #[inline]
    pub const fn weeks(&self) -> &[u8; MONTHS_PER_YEAR] {
        &self.0
    }

    /// Weeks in the zero-based fiscal month `index`
    #[inline]
    pub const fn month(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Weeks in the months before the zero-based fiscal month `index`
    pub fn weeks_before(&self, index: usize) -> u32 {
        self.0[..index].iter().copied().map(u32::from).sum()
    }

    /// Total weeks in the year: 52, or 53 with an extra week
    pub fn total_weeks(&self) -> u32 {
        self.weeks_before(MONTHS_PER_YEAR)
    }
}
