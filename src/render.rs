//! Fixed-width text layout of a fiscal calendar.
//!
//! Months are laid out in rows, each month headed by the abbreviation of the
//! Gregorian month it is named after. Every week line starts with the fiscal
//! week number:
//!
//! ```text
//!            Feb                         Mar
//! 01| 29 30 31 01 02 03 04    05| 26 27 28 01 02 03 04
//! ```

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DAYS_PER_WEEK, DEFAULT_COLUMN_WIDTH, DEFAULT_MONTH_SPACING, DEFAULT_MONTHS_PER_ROW,
    MONTHS_PER_YEAR, WEEK_LINES_PER_ROW, WEEK_NUMBER_GUTTER,
};
use crate::{FiscalCalendar, FiscalMonth, FiscalWeek};

/// Layout options for [`CalendarLayout::render`].
///
/// Values below the defaults for `column_width` and `month_spacing` are
/// raised to the defaults; `months_per_row` is kept within `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarLayout {
    pub column_width:   usize,
    pub month_spacing:  usize,
    pub months_per_row: usize,
}

impl Default for CalendarLayout {
    fn default() -> Self {
        Self {
            column_width:   DEFAULT_COLUMN_WIDTH,
            month_spacing:  DEFAULT_MONTH_SPACING,
            months_per_row: DEFAULT_MONTHS_PER_ROW,
        }
    }
}

impl CalendarLayout {
    /// Clamps every option into its supported range
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            column_width:   self.column_width.max(DEFAULT_COLUMN_WIDTH),
            month_spacing:  self.month_spacing.max(DEFAULT_MONTH_SPACING),
            months_per_row: self.months_per_row.clamp(1, MONTHS_PER_YEAR),
        }
    }

    /// Width of one month column, week number gutter included
    pub fn month_width(&self) -> usize {
        let layout = self.normalized();
        (layout.column_width + 1) * DAYS_PER_WEEK as usize + WEEK_NUMBER_GUTTER
    }

    /// Width of a full row of months
    pub fn total_width(&self) -> usize {
        let layout = self.normalized();
        (self.month_width() + layout.month_spacing) * layout.months_per_row - layout.month_spacing
    }

    pub fn render(&self, calendar: &FiscalCalendar) -> String {
        let layout = self.normalized();
        let month_width = layout.month_width();
        let gap = " ".repeat(layout.month_spacing);
        let months = calendar.year_weeks();

        let mut out = String::new();
        push_line(
            &mut out,
            &format!("{:^width$}", calendar.year(), width = layout.total_width()),
        );
        out.push('\n');

        for row in months.chunks(layout.months_per_row) {
            let header: Vec<String> = row
                .iter()
                .map(|month| format!("{:^month_width$}", month.abbreviation()))
                .collect();
            push_line(&mut out, &header.join(&gap));

            let lines = row
                .iter()
                .map(FiscalMonth::week_count)
                .max()
                .unwrap_or_default()
                .max(WEEK_LINES_PER_ROW);
            for slot in 0..lines {
                let cells: Vec<String> = row
                    .iter()
                    .map(|month| match month.weeks().get(slot) {
                        Some(week) => layout.week_cell(week),
                        // 4-week months leave the last slot empty
                        None => " ".repeat(month_width),
                    })
                    .collect();
                push_line(&mut out, &cells.join(&gap));
            }
            out.push('\n');
        }

        out
    }

    fn week_cell(&self, week: &FiscalWeek) -> String {
        let days: String = week
            .days()
            .iter()
            .map(|day| format!("{:0width$} ", day.day(), width = self.column_width))
            .collect();
        format!("{:02}| {days}", week.number())
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}
