//! NRF 4-5-4 retail calendar.
//!
//! A retail fiscal year is 52 or 53 whole weeks long. It starts on a fixed
//! weekday near the first day of an anchor month, February by default. Each
//! quarter holds months of 4, 5 and 4 weeks. When the solar year drifts far
//! enough, the last month absorbs a 53rd week.
//!
//! ```
//! use retail_calendar::FiscalCalendar;
//!
//! let calendar = FiscalCalendar::new(2023, 2)?;
//! assert!(calendar.has_extra_week());
//! assert_eq!(calendar.start_date().to_string(), "2023-01-29");
//! assert_eq!(calendar.end_date().to_string(), "2024-02-03");
//! # Ok::<(), retail_calendar::CalendarError>(())
//! ```

mod boundary;
mod calendar;
mod config;
mod consts;
mod error;
mod prelude;
mod range;
mod render;
mod types;
mod week;

pub use boundary::{CycleBoundary, CycleKey, LeapWeekCache, resolve_cycle};
pub use calendar::{CalendarFactory, FiscalCalendar, FiscalYear};
pub use config::{FiscalYearConfig, parse_weekday};
pub use consts::*;
pub use error::{CalendarError, ConfigError};
pub use range::DateSpan;
pub use render::CalendarLayout;
pub use types::{Month, QuarterPattern, WeekPattern, Year};
pub use week::{FiscalMonth, FiscalWeek};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Installs a global `tracing` subscriber that reads `RUST_LOG`, warning
/// level by default. Later calls are no-ops.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("retail_calendar=warn"));

        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
