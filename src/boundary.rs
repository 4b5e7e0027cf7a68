//! Fiscal year boundaries and 53rd-week detection.
//!
//! NRF starts the retail year on the week holding the first day of the anchor
//! month, except when four or more days of that week still belong to the
//! previous month. In that case the year starts one week later and the
//! previous year absorbs a 53rd week.
//!
//! A boundary is resolved over two cycles: the prior year's nominal start
//! pins down where the current year really begins, and the current year's
//! nominal end then decides whether it needs the extra week. Every resolved
//! boundary is memoized in a [`LeapWeekCache`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::consts::{
    DAYS_PER_WEEK, DEFAULT_CACHE_CAPACITY, MAX_MONTH, MIN_DAY, TRAILING_DAYS_THRESHOLD,
    WEEKS_PER_YEAR,
};
use crate::{CalendarError, Month};

/// Cache key: a fiscal cycle is fully determined by these three values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleKey {
    pub year:             i32,
    pub start_month:      Month,
    pub starting_weekday: Weekday,
}

/// The resolved first day of a fiscal year and whether that year runs 53 weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleBoundary {
    pub start:      NaiveDate,
    pub extra_week: bool,
}

/// Resolves the boundary of the fiscal year anchored on `start_month` of `year`.
///
/// # Errors
/// Returns `CalendarError::DateOutOfRange` if the anchor date of the prior
/// year, or the end of a month the cycle touches, can't be represented.
pub fn resolve_cycle(
    year: i32,
    start_month: Month,
    starting_weekday: Weekday,
) -> Result<CycleBoundary, CalendarError> {
    // The prior cycle, 53 weeks or not, fixes the first day of this one
    let prior_start = anchor_week_start(year - 1, start_month, starting_weekday)?;
    let mut prior_end = prior_start + Duration::weeks(WEEKS_PER_YEAR) - Duration::days(1);
    if trailing_days(prior_end)? >= TRAILING_DAYS_THRESHOLD {
        prior_end += Duration::days(DAYS_PER_WEEK);
    }

    let start = prior_end + Duration::days(1);
    let end = start + Duration::weeks(WEEKS_PER_YEAR) - Duration::days(1);
    let extra_week =
        end.month() != start_month.number() && trailing_days(end)? >= TRAILING_DAYS_THRESHOLD;

    Ok(CycleBoundary { start, extra_week })
}

/// The starting weekday on or before the 1st of `month` in `year`
///
/// # Errors
/// Returns `CalendarError::DateOutOfRange` if that 1st can't be represented.
pub fn anchor_week_start(
    year: i32,
    month: Month,
    starting_weekday: Weekday,
) -> Result<NaiveDate, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month.number(), MIN_DAY).ok_or(
        CalendarError::DateOutOfRange {
            year,
            month: month.get(),
        },
    )?;
    Ok(first - Duration::days(days_since(first.weekday(), starting_weekday)))
}

/// Days from the most recent `start` weekday to `day` (0..=6)
pub fn days_since(day: Weekday, start: Weekday) -> i64 {
    let week = DAYS_PER_WEEK as u32;
    i64::from((week + day.num_days_from_monday() - start.num_days_from_monday()) % week)
}

/// Days left in the month after `date`
fn trailing_days(date: NaiveDate) -> Result<u32, CalendarError> {
    let last_of_month = date
        .with_day(MIN_DAY)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| CalendarError::DateOutOfRange {
            year:  date.year(),
            month: u8::try_from(date.month()).unwrap_or(MAX_MONTH),
        })?;
    Ok(last_of_month.day() - date.day())
}

/// Bounded memo of resolved cycle boundaries.
///
/// Safe to share between threads; wrap it in an `Arc` to let several
/// calendars reuse the same entries. Once `capacity` entries are held, the
/// oldest one is evicted.
#[derive(Debug)]
pub struct LeapWeekCache {
    capacity: usize,
    entries:  Mutex<IndexMap<CycleKey, CycleBoundary>>,
}

impl LeapWeekCache {
    /// Creates an empty cache holding at most `capacity` boundaries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the boundary for `key`, computing and storing it on a miss.
    ///
    /// # Errors
    /// Propagates `CalendarError::DateOutOfRange` from [`resolve_cycle`].
    pub fn resolve(&self, key: CycleKey) -> Result<CycleBoundary, CalendarError> {
        if let Some(hit) = self.lock().get(&key).copied() {
            trace!(year = key.year, month = key.start_month.get(), "cycle boundary cache hit");
            return Ok(hit);
        }

        let boundary = resolve_cycle(key.year, key.start_month, key.starting_weekday)?;
        debug!(
            year = key.year,
            month = key.start_month.get(),
            weekday = %key.starting_weekday,
            start = %boundary.start,
            extra_week = boundary.extra_week,
            "resolved cycle boundary"
        );

        let mut entries = self.lock();
        let evicted = if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.shift_remove_index(0)
        } else {
            None
        };
        entries.insert(key, boundary);
        drop(entries);

        if let Some((evicted, _)) = evicted {
            trace!(year = evicted.year, month = evicted.start_month.get(), "evicted cycle boundary");
        }
        Ok(boundary)
    }

    /// Whether the fiscal year described by `key` has 53 weeks
    ///
    /// # Errors
    /// Propagates `CalendarError::DateOutOfRange` from [`resolve_cycle`].
    pub fn has_extra_week(&self, key: CycleKey) -> Result<bool, CalendarError> {
        self.resolve(key).map(|boundary| boundary.extra_week)
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<CycleKey, CycleBoundary>> {
        // Entries are plain values, a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LeapWeekCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn month(value: u8) -> Month {
        Month::new(value).expect("valid test month")
    }

    fn key(year: i32, start_month: u8) -> CycleKey {
        CycleKey {
            year,
            start_month: month(start_month),
            starting_weekday: Weekday::Sun,
        }
    }

    #[test]
    fn test_days_since() {
        assert_eq!(days_since(Weekday::Sun, Weekday::Sun), 0);
        assert_eq!(days_since(Weekday::Mon, Weekday::Sun), 1);
        assert_eq!(days_since(Weekday::Sat, Weekday::Sun), 6);
        assert_eq!(days_since(Weekday::Sun, Weekday::Mon), 6);
        assert_eq!(days_since(Weekday::Wed, Weekday::Mon), 2);
    }

    #[test]
    fn test_trailing_days() {
        for (day, expected) in [
            (date(2023, 1, 28), 3),
            (date(2023, 1, 31), 0),
            (date(2023, 2, 25), 3),
            (date(2024, 2, 25), 4),
            (date(1900, 2, 28), 0),
            (date(2000, 2, 28), 1),
            (date(2023, 4, 26), 4),
            (date(2023, 12, 27), 4),
        ] {
            assert_eq!(trailing_days(day).unwrap(), expected, "Date {day}");
        }
    }

    #[test]
    fn test_trailing_days_at_calendar_limit() {
        assert!(matches!(
            trailing_days(NaiveDate::MAX),
            Err(CalendarError::DateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_anchor_week_start() {
        // 2023-02-01 is a Wednesday
        assert_eq!(
            anchor_week_start(2023, month(2), Weekday::Sun).unwrap(),
            date(2023, 1, 29)
        );
        // 2026-02-01 is a Sunday
        assert_eq!(
            anchor_week_start(2026, month(2), Weekday::Sun).unwrap(),
            date(2026, 2, 1)
        );
        assert_eq!(
            anchor_week_start(2023, month(2), Weekday::Mon).unwrap(),
            date(2023, 1, 30)
        );
    }

    #[test]
    fn test_resolve_cycle_known_boundaries() {
        struct TestCase {
            year:        i32,
            start_month: u8,
            start:       NaiveDate,
            extra_week:  bool,
        }

        let cases = [
            TestCase {
                year:        2023,
                start_month: 2,
                start:       date(2023, 1, 29),
                extra_week:  true,
            },
            TestCase {
                year:        2024,
                start_month: 2,
                start:       date(2024, 2, 4),
                extra_week:  false,
            },
            TestCase {
                year:        2025,
                start_month: 2,
                start:       date(2025, 2, 2),
                extra_week:  false,
            },
            TestCase {
                year:        2020,
                start_month: 1,
                start:       date(2019, 12, 29),
                extra_week:  true,
            },
            TestCase {
                year:        2021,
                start_month: 1,
                start:       date(2021, 1, 3),
                extra_week:  false,
            },
        ];

        for case in &cases {
            let boundary = resolve_cycle(case.year, month(case.start_month), Weekday::Sun).unwrap();
            assert_eq!(boundary.start, case.start, "start of {}/{}", case.year, case.start_month);
            assert_eq!(
                boundary.extra_week, case.extra_week,
                "extra week of {}/{}",
                case.year, case.start_month
            );
        }
    }

    #[test]
    fn test_cache_memoizes() {
        let cache = LeapWeekCache::new(8);
        assert!(cache.is_empty());

        let first = cache.resolve(key(2023, 2)).unwrap();
        let second = cache.resolve(key(2023, 2)).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.resolve(key(2023, 1)).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_evicts_oldest_at_capacity() {
        let cache = LeapWeekCache::new(2);
        cache.resolve(key(2020, 2)).unwrap();
        cache.resolve(key(2021, 2)).unwrap();
        cache.resolve(key(2022, 2)).unwrap();
        assert_eq!(cache.len(), 2);

        // Re-resolving an evicted key recomputes the same value
        assert_eq!(
            cache.resolve(key(2020, 2)).unwrap(),
            resolve_cycle(2020, month(2), Weekday::Sun).unwrap()
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_capacity_floor() {
        let cache = LeapWeekCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.has_extra_week(key(2023, 2)).unwrap());
        assert!(!cache.has_extra_week(key(2024, 2)).unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_shared_across_threads() {
        let cache = std::sync::Arc::new(LeapWeekCache::default());
        let handles: Vec<_> = (2000..2008)
            .map(|year| {
                let cache = std::sync::Arc::clone(&cache);
                std::thread::spawn(move || cache.has_extra_week(key(year, 2)))
            })
            .collect();

        let flags: Vec<bool> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        assert_eq!(flags, [true, false, false, false, false, false, true, false]);
        assert_eq!(cache.len(), 8);
    }
}
