use std::process::ExitCode;

use chrono::Weekday;
use clap::Parser;
use retail_calendar::{
    CalendarError, CalendarLayout, DEFAULT_COLUMN_WIDTH, DEFAULT_MONTH_SPACING,
    DEFAULT_MONTHS_PER_ROW, DEFAULT_START_MONTH, FiscalCalendar, FiscalYearConfig, Month,
    QuarterPattern, Year, parse_weekday,
};

/// Print the NRF 4-5-4 retail calendar for a fiscal year.
#[derive(Debug, Parser)]
#[command(name = "retail-cal", version, about)]
struct Cli {
    /// Fiscal year to print [default: current year]
    year: Option<u16>,

    /// Gregorian month the fiscal year is anchored on
    #[arg(short = 's', long = "start-month", visible_alias = "start_month", default_value_t = DEFAULT_START_MONTH)]
    start_month: u8,

    /// Weekday every fiscal week starts on
    #[arg(short = 'w', long, default_value = "sun", value_parser = parse_weekday)]
    weekday: Weekday,

    /// Weeks per month within a quarter
    #[arg(short = 'p', long, default_value = "4-5-4")]
    pattern: QuarterPattern,

    /// Width of each day column
    #[arg(long, default_value_t = DEFAULT_COLUMN_WIDTH)]
    column_width: usize,

    /// Blank columns between months
    #[arg(long, default_value_t = DEFAULT_MONTH_SPACING)]
    month_spacing: usize,

    /// Months per row
    #[arg(long, default_value_t = DEFAULT_MONTHS_PER_ROW)]
    months_per_row: usize,
}

impl Cli {
    fn config(&self) -> Result<FiscalYearConfig, CalendarError> {
        let year = match self.year {
            Some(year) => Year::new(year)?,
            None => Year::current(),
        };
        Ok(FiscalYearConfig {
            year,
            start_month: Month::new(self.start_month)?,
            starting_weekday: self.weekday,
            quarter_pattern: self.pattern,
        })
    }

    const fn layout(&self) -> CalendarLayout {
        CalendarLayout {
            column_width:   self.column_width,
            month_spacing:  self.month_spacing,
            months_per_row: self.months_per_row,
        }
    }
}

fn run(cli: &Cli) -> Result<String, CalendarError> {
    let calendar = FiscalCalendar::from_config(&cli.config()?)?;
    tracing::info!(
        year = calendar.year().get(),
        start = %calendar.start_date(),
        end = %calendar.end_date(),
        "rendering fiscal calendar"
    );
    Ok(cli.layout().render(&calendar))
}

fn main() -> ExitCode {
    retail_calendar::init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        },
    }
}
