use std::sync::Arc;

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::{CycleKey, LeapWeekCache};
use crate::consts::{DAYS_PER_WEEK, MONTHS_PER_QUARTER, MONTHS_PER_YEAR, QUARTERS_PER_YEAR};
use crate::{
    CalendarError, DateSpan, FiscalMonth, FiscalWeek, FiscalYearConfig, Month, QuarterPattern,
    WeekPattern, Year,
};

/// The derived extent of one fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalYear {
    pub start:          NaiveDate,
    pub end:            NaiveDate,
    pub has_extra_week: bool,
    pub week_pattern:   WeekPattern,
}

impl FiscalYear {
    pub fn span(&self) -> DateSpan {
        DateSpan::between(self.start, self.end)
    }

    /// 364 days, or 371 with an extra week
    pub fn num_days(&self) -> i64 {
        self.span().num_days()
    }
}

/// A 4-5-4 retail calendar for one fiscal year.
///
/// All dates are derived once at construction; the calendar is immutable
/// afterwards. Calendars built through the same [`CalendarFactory`] share one
/// [`LeapWeekCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalCalendar {
    config:            FiscalYearConfig,
    fiscal_year:       FiscalYear,
    prior_extra_week:  bool,
    month_start_dates: [NaiveDate; MONTHS_PER_YEAR],
}

impl FiscalCalendar {
    /// Builds the calendar for `year` with the fiscal year anchored on
    /// `start_month`, using Sunday weeks and the 4-5-4 pattern.
    ///
    /// # Errors
    /// Returns `CalendarError::Config` if `year` or `start_month` is out of range.
    pub fn new(year: u16, start_month: u8) -> Result<Self, CalendarError> {
        Self::from_config(&FiscalYearConfig::new(year, start_month)?)
    }

    /// Builds the calendar with a private cache
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if a boundary can't be represented.
    pub fn from_config(config: &FiscalYearConfig) -> Result<Self, CalendarError> {
        // prior, current and next year
        Self::with_cache(config, &LeapWeekCache::new(3))
    }

    /// Builds the calendar, resolving boundaries through `cache`
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if a boundary can't be represented.
    pub fn with_cache(config: &FiscalYearConfig, cache: &LeapWeekCache) -> Result<Self, CalendarError> {
        let year = config.year.as_i32();
        let key = |year| CycleKey {
            year,
            start_month: config.start_month,
            starting_weekday: config.starting_weekday,
        };

        let prior = cache.resolve(key(year - 1))?;
        let current = cache.resolve(key(year))?;
        let next = cache.resolve(key(year + 1))?;

        let week_pattern = WeekPattern::new(config.quarter_pattern, current.extra_week);
        let fiscal_year = FiscalYear {
            start: current.start,
            end: next.start - Duration::days(1),
            has_extra_week: current.extra_week,
            week_pattern,
        };

        let mut month_start_dates = [fiscal_year.start; MONTHS_PER_YEAR];
        for (index, start) in month_start_dates.iter_mut().enumerate() {
            *start = fiscal_year.start + whole_weeks(week_pattern.weeks_before(index));
        }

        debug!(
            year,
            month = config.start_month.get(),
            start = %fiscal_year.start,
            end = %fiscal_year.end,
            extra_week = fiscal_year.has_extra_week,
            "built fiscal calendar"
        );

        Ok(Self {
            config: *config,
            fiscal_year,
            prior_extra_week: prior.extra_week,
            month_start_dates,
        })
    }

    pub const fn config(&self) -> &FiscalYearConfig {
        &self.config
    }

    pub const fn year(&self) -> Year {
        self.config.year
    }

    pub const fn start_month(&self) -> Month {
        self.config.start_month
    }

    pub const fn starting_weekday(&self) -> Weekday {
        self.config.starting_weekday
    }

    pub const fn fiscal_year(&self) -> &FiscalYear {
        &self.fiscal_year
    }

    pub const fn week_pattern(&self) -> &WeekPattern {
        &self.fiscal_year.week_pattern
    }

    /// Whether this fiscal year runs 53 weeks
    pub const fn has_extra_week(&self) -> bool {
        self.fiscal_year.has_extra_week
    }

    /// Whether the previous fiscal year ran 53 weeks
    pub const fn prior_has_extra_week(&self) -> bool {
        self.prior_extra_week
    }

    /// First day of the fiscal year
    pub const fn start_date(&self) -> NaiveDate {
        self.fiscal_year.start
    }

    /// Last day of the fiscal year (inclusive)
    pub const fn end_date(&self) -> NaiveDate {
        self.fiscal_year.end
    }

    pub fn year_span(&self) -> DateSpan {
        self.fiscal_year.span()
    }

    pub const fn month_start_dates(&self) -> [NaiveDate; MONTHS_PER_YEAR] {
        self.month_start_dates
    }

    pub fn month_end_dates(&self) -> [NaiveDate; MONTHS_PER_YEAR] {
        let pattern = self.week_pattern();
        let mut ends = self.month_start_dates;
        for (index, end) in ends.iter_mut().enumerate() {
            *end = self.start_date() + whole_weeks(pattern.weeks_before(index + 1)) - Duration::days(1);
        }
        ends
    }

    pub fn quarter_start_dates(&self) -> [NaiveDate; QUARTERS_PER_YEAR] {
        let pattern = self.week_pattern();
        let mut starts = [self.start_date(); QUARTERS_PER_YEAR];
        for (quarter, start) in starts.iter_mut().enumerate() {
            *start = self.start_date() + whole_weeks(pattern.weeks_before(quarter * MONTHS_PER_QUARTER));
        }
        starts
    }

    pub fn quarter_end_dates(&self) -> [NaiveDate; QUARTERS_PER_YEAR] {
        let pattern = self.week_pattern();
        let mut ends = [self.start_date(); QUARTERS_PER_YEAR];
        for (quarter, end) in ends.iter_mut().enumerate() {
            *end = self.start_date()
                + whole_weeks(pattern.weeks_before((quarter + 1) * MONTHS_PER_QUARTER))
                - Duration::days(1);
        }
        ends
    }

    pub fn month_spans(&self) -> [DateSpan; MONTHS_PER_YEAR] {
        let ends = self.month_end_dates();
        std::array::from_fn(|index| DateSpan::between(self.month_start_dates[index], ends[index]))
    }

    pub fn quarter_spans(&self) -> [DateSpan; QUARTERS_PER_YEAR] {
        let starts = self.quarter_start_dates();
        let ends = self.quarter_end_dates();
        std::array::from_fn(|index| DateSpan::between(starts[index], ends[index]))
    }

    /// Span of fiscal quarter `quarter` (1-based)
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidQuarter` unless `quarter` is in `1..=4`.
    pub fn quarter_span(&self, quarter: u8) -> Result<DateSpan, CalendarError> {
        let index = usize::from(quarter)
            .checked_sub(1)
            .filter(|index| *index < QUARTERS_PER_YEAR)
            .ok_or(CalendarError::InvalidQuarter(quarter))?;
        Ok(self.quarter_spans()[index])
    }

    /// Weeks of fiscal month `month` (1-based), numbered continuously from
    /// the start of the fiscal year
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidPeriod` unless `month` is in `1..=12`.
    pub fn month_weeks(&self, month: u8) -> Result<Vec<FiscalWeek>, CalendarError> {
        let index = month_index(month)?;
        Ok(self.weeks_of(index).collect())
    }

    /// All twelve fiscal months with their weeks
    pub fn year_weeks(&self) -> Vec<FiscalMonth> {
        (0..MONTHS_PER_YEAR)
            .zip(1u8..)
            .map(|(index, number)| {
                FiscalMonth::new(
                    number,
                    self.config.start_month.wrapping_add(index),
                    self.weeks_of(index).collect(),
                )
            })
            .collect()
    }

    /// Every week of the fiscal year, in order
    pub fn weeks(&self) -> impl Iterator<Item = FiscalWeek> + '_ {
        (0..MONTHS_PER_YEAR).flat_map(|index| self.weeks_of(index))
    }

    /// The fiscal week holding `date`, if it falls inside this fiscal year
    pub fn week_of(&self, date: NaiveDate) -> Option<FiscalWeek> {
        if !self.year_span().contains(date) {
            return None;
        }
        let offset = (date - self.start_date()).num_days() / DAYS_PER_WEEK;
        let number = u32::try_from(offset).ok()? + 1;
        let first_day = self.start_date() + Duration::weeks(offset);
        Some(FiscalWeek::starting(number, first_day))
    }

    /// The 1-based fiscal month holding `date`, if it falls inside this fiscal year
    pub fn month_of(&self, date: NaiveDate) -> Option<u8> {
        self.month_spans()
            .iter()
            .zip(1u8..)
            .find(|(span, _)| span.contains(date))
            .map(|(_, number)| number)
    }

    fn weeks_of(&self, index: usize) -> impl Iterator<Item = FiscalWeek> + use<> {
        let pattern = self.week_pattern();
        let first_number = pattern.weeks_before(index) + 1;
        let month_start = self.month_start_dates[index];
        (0..u32::from(pattern.month(index))).map(move |offset| {
            FiscalWeek::starting(first_number + offset, month_start + whole_weeks(offset))
        })
    }
}

/// Builds calendars that share one [`LeapWeekCache`].
///
/// Also answers the year-level boundary questions without building a whole
/// calendar.
#[derive(Debug, Clone)]
pub struct CalendarFactory {
    cache:            Arc<LeapWeekCache>,
    starting_weekday: Weekday,
    quarter_pattern:  QuarterPattern,
}

impl CalendarFactory {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(LeapWeekCache::default()))
    }

    pub const fn with_cache(cache: Arc<LeapWeekCache>) -> Self {
        Self {
            cache,
            starting_weekday: Weekday::Sun,
            quarter_pattern: QuarterPattern::NRF,
        }
    }

    #[must_use]
    pub const fn starting_weekday(mut self, weekday: Weekday) -> Self {
        self.starting_weekday = weekday;
        self
    }

    #[must_use]
    pub const fn quarter_pattern(mut self, pattern: QuarterPattern) -> Self {
        self.quarter_pattern = pattern;
        self
    }

    pub const fn cache(&self) -> &Arc<LeapWeekCache> {
        &self.cache
    }

    /// Whether the fiscal year anchored on `start_month` of `year` runs 53 weeks
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if the boundary can't be represented.
    pub fn has_extra_week(&self, year: Year, start_month: Month) -> Result<bool, CalendarError> {
        self.cache.has_extra_week(self.key(year.as_i32(), start_month))
    }

    /// First day of the fiscal year
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if the boundary can't be represented.
    pub fn year_start_date(&self, year: Year, start_month: Month) -> Result<NaiveDate, CalendarError> {
        Ok(self.cache.resolve(self.key(year.as_i32(), start_month))?.start)
    }

    /// Last day of the fiscal year: the day before the next one starts
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if the boundary can't be represented.
    pub fn year_end_date(&self, year: Year, start_month: Month) -> Result<NaiveDate, CalendarError> {
        let next = self.cache.resolve(self.key(year.as_i32() + 1, start_month))?;
        Ok(next.start - Duration::days(1))
    }

    /// Builds the calendar for `year` with this factory's weekday and pattern
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if a boundary can't be represented.
    pub fn calendar(&self, year: Year, start_month: Month) -> Result<FiscalCalendar, CalendarError> {
        let config = FiscalYearConfig {
            year,
            start_month,
            starting_weekday: self.starting_weekday,
            quarter_pattern: self.quarter_pattern,
        };
        FiscalCalendar::with_cache(&config, &self.cache)
    }

    /// Builds the calendar described by `config`, sharing this factory's cache
    ///
    /// # Errors
    /// Returns `CalendarError::DateOutOfRange` if a boundary can't be represented.
    pub fn from_config(&self, config: &FiscalYearConfig) -> Result<FiscalCalendar, CalendarError> {
        FiscalCalendar::with_cache(config, &self.cache)
    }

    const fn key(&self, year: i32, start_month: Month) -> CycleKey {
        CycleKey {
            year,
            start_month,
            starting_weekday: self.starting_weekday,
        }
    }
}

impl Default for CalendarFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn whole_weeks(count: u32) -> Duration {
    Duration::weeks(i64::from(count))
}

fn month_index(month: u8) -> Result<usize, CalendarError> {
    usize::from(month)
        .checked_sub(1)
        .filter(|index| *index < MONTHS_PER_YEAR)
        .ok_or(CalendarError::InvalidPeriod(month))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn calendar(year: u16, start_month: u8) -> FiscalCalendar {
        FiscalCalendar::new(year, start_month).expect("failed to build calendar")
    }

    #[test]
    fn test_2023_nrf_year() {
        let cal = calendar(2023, 2);
        assert_eq!(cal.start_date(), date(2023, 1, 29));
        assert_eq!(cal.end_date(), date(2024, 2, 3));
        assert!(cal.has_extra_week());
        assert!(!cal.prior_has_extra_week());
        assert_eq!(cal.fiscal_year().num_days(), 371);
        assert_eq!(cal.week_pattern().total_weeks(), 53);
    }

    #[test]
    fn test_2024_follows_extra_week() {
        let cal = calendar(2024, 2);
        assert_eq!(cal.start_date(), date(2024, 2, 4));
        assert_eq!(cal.end_date(), date(2025, 2, 1));
        assert!(!cal.has_extra_week());
        assert!(cal.prior_has_extra_week());
        assert_eq!(cal.fiscal_year().num_days(), 364);
    }

    #[test]
    fn test_month_dates_2023() {
        let cal = calendar(2023, 2);
        let starts = cal.month_start_dates();
        let ends = cal.month_end_dates();

        assert_eq!(starts[0], date(2023, 1, 29));
        assert_eq!(ends[0], date(2023, 2, 25));
        assert_eq!(starts[1], date(2023, 2, 26));
        assert_eq!(ends[1], date(2023, 4, 1));
        assert_eq!(starts[2], date(2023, 4, 2));
        assert_eq!(starts[11], date(2023, 12, 31));
        assert_eq!(ends[11], date(2024, 2, 3));
    }

    #[test]
    fn test_quarter_dates_2023() {
        let cal = calendar(2023, 2);
        assert_eq!(
            cal.quarter_start_dates(),
            [date(2023, 1, 29), date(2023, 4, 30), date(2023, 7, 30), date(2023, 10, 29)]
        );
        assert_eq!(
            cal.quarter_end_dates(),
            [date(2023, 4, 29), date(2023, 7, 29), date(2023, 10, 28), date(2024, 2, 3)]
        );
        assert_eq!(cal.quarter_span(4).unwrap().num_days(), 14 * 7);
        assert!(matches!(cal.quarter_span(0), Err(CalendarError::InvalidQuarter(0))));
        assert!(matches!(cal.quarter_span(5), Err(CalendarError::InvalidQuarter(5))));
    }

    #[test]
    fn test_month_weeks_numbering() {
        let cal = calendar(2023, 2);

        let first = cal.month_weeks(1).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].number(), 1);
        assert_eq!(first[0].first_day(), date(2023, 1, 29));

        let second = cal.month_weeks(2).unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].number(), 5);
        assert_eq!(second[0].first_day(), date(2023, 2, 26));

        let last = cal.month_weeks(12).unwrap();
        assert_eq!(last.len(), 5);
        assert_eq!(last[4].number(), 53);
        assert_eq!(last[4].last_day(), date(2024, 2, 3));
    }

    #[test]
    fn test_month_weeks_rejects_bad_index() {
        let cal = calendar(2023, 2);
        assert!(matches!(cal.month_weeks(0), Err(CalendarError::InvalidPeriod(0))));
        assert!(matches!(cal.month_weeks(13), Err(CalendarError::InvalidPeriod(13))));
    }

    #[test]
    fn test_year_weeks_names_months_from_start_month() {
        let cal = calendar(2023, 2);
        let months = cal.year_weeks();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].abbreviation(), "Feb");
        assert_eq!(months[10].abbreviation(), "Dec");
        assert_eq!(months[11].abbreviation(), "Jan");
        assert_eq!(months[11].index(), 12);

        let jan = calendar(2023, 1).year_weeks();
        assert_eq!(jan[0].abbreviation(), "Jan");
        assert_eq!(jan[11].abbreviation(), "Dec");
    }

    #[test]
    fn test_weeks_iterator_is_continuous() {
        let cal = calendar(2023, 2);
        let all: Vec<FiscalWeek> = cal.weeks().collect();
        assert_eq!(all.len(), 53);
        for (expected, week) in (1..).zip(&all) {
            assert_eq!(week.number(), expected);
        }
        for pair in all.windows(2) {
            assert_eq!(pair[0].last_day() + Duration::days(1), pair[1].first_day());
        }
    }

    #[test]
    fn test_week_of_and_month_of() {
        let cal = calendar(2023, 2);

        let week = cal.week_of(date(2023, 2, 1)).unwrap();
        assert_eq!(week.number(), 1);
        assert_eq!(week.first_day(), date(2023, 1, 29));

        let week = cal.week_of(date(2024, 2, 3)).unwrap();
        assert_eq!(week.number(), 53);

        assert_eq!(cal.month_of(date(2023, 1, 29)), Some(1));
        assert_eq!(cal.month_of(date(2023, 2, 26)), Some(2));
        assert_eq!(cal.month_of(date(2024, 2, 3)), Some(12));

        assert_eq!(cal.week_of(date(2023, 1, 28)), None);
        assert_eq!(cal.month_of(date(2024, 2, 4)), None);
    }

    #[test]
    fn test_week_of_matches_weeks_iterator() {
        let cal = calendar(2017, 1);
        for week in cal.weeks() {
            for day in week.days() {
                assert_eq!(cal.week_of(*day), Some(week));
            }
        }
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            FiscalCalendar::new(2023, 0),
            Err(CalendarError::Config(crate::ConfigError::InvalidMonth(0)))
        ));
        assert!(matches!(
            FiscalCalendar::new(2023, 13),
            Err(CalendarError::Config(crate::ConfigError::InvalidMonth(13)))
        ));
        assert!(matches!(
            FiscalCalendar::new(0, 2),
            Err(CalendarError::Config(crate::ConfigError::InvalidYear(0)))
        ));
    }

    #[test]
    fn test_monday_weeks() {
        let config = FiscalYearConfig::new(2023, 2)
            .unwrap()
            .with_starting_weekday(Weekday::Mon);
        let cal = FiscalCalendar::from_config(&config).unwrap();
        assert_eq!(cal.starting_weekday(), Weekday::Mon);
        assert_eq!(cal.start_date(), date(2023, 1, 30));
        for week in cal.weeks() {
            assert_eq!(chrono::Datelike::weekday(&week.first_day()), Weekday::Mon);
        }
    }

    #[test]
    fn test_alternate_quarter_pattern() {
        let config = FiscalYearConfig::new(2024, 2)
            .unwrap()
            .with_quarter_pattern(QuarterPattern::new([4, 4, 5]).unwrap());
        let cal = FiscalCalendar::from_config(&config).unwrap();
        let counts: Vec<usize> = cal.year_weeks().iter().map(FiscalMonth::week_count).collect();
        assert_eq!(counts, [4, 4, 5, 4, 4, 5, 4, 4, 5, 4, 4, 5]);
        assert_eq!(cal.month_end_dates()[11], cal.end_date());
    }

    #[test]
    fn test_factory_year_level_queries() {
        let factory = CalendarFactory::new();
        let february = Month::new(2).unwrap();
        let y2023 = Year::new(2023).unwrap();

        assert!(factory.has_extra_week(y2023, february).unwrap());
        assert_eq!(factory.year_start_date(y2023, february).unwrap(), date(2023, 1, 29));
        assert_eq!(factory.year_end_date(y2023, february).unwrap(), date(2024, 2, 3));
    }

    #[test]
    fn test_factory_shares_cache() {
        let cache = Arc::new(LeapWeekCache::new(16));
        let factory = CalendarFactory::with_cache(Arc::clone(&cache));
        let february = Month::new(2).unwrap();

        let a = factory.calendar(Year::new(2023).unwrap(), february).unwrap();
        assert_eq!(cache.len(), 3);
        // 2023 and 2024 are already cached, only 2025 is new
        let b = factory.calendar(Year::new(2024).unwrap(), february).unwrap();
        assert_eq!(cache.len(), 4);

        assert_eq!(a.end_date() + Duration::days(1), b.start_date());
        assert_eq!(b, calendar(2024, 2));
    }

    #[test]
    fn test_factory_from_config_uses_config_weekday() {
        let factory = CalendarFactory::new();
        let config = FiscalYearConfig::new(2023, 2)
            .unwrap()
            .with_starting_weekday(Weekday::Sat);
        let cal = factory.from_config(&config).unwrap();
        assert_eq!(chrono::Datelike::weekday(&cal.start_date()), Weekday::Sat);
    }
}
