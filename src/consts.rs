/// Minimum valid year (inclusive)
pub const MIN_YEAR: u16 = 1;
/// Maximum valid year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u32 = 1;

/// Month number for February
pub const FEBRUARY: u8 = 2;

/// Fiscal years usually start in February so holiday sales and returns land
/// in the same fiscal year
pub const DEFAULT_START_MONTH: u8 = FEBRUARY;

/// Weeks per fiscal month within one quarter
pub const DEFAULT_QUARTER_PATTERN: [u8; 3] = [4, 5, 4];

pub const DAYS_PER_WEEK: i64 = 7;
/// Weeks in a regular (non leap-week) fiscal year
pub const WEEKS_PER_YEAR: i64 = 52;
pub const MONTHS_PER_QUARTER: usize = 3;
pub const QUARTERS_PER_YEAR: usize = 4;
pub const MONTHS_PER_YEAR: usize = MONTHS_PER_QUARTER * QUARTERS_PER_YEAR;

/// A cycle boundary is pushed one week forward when its month still has at
/// least this many days left after it
pub const TRAILING_DAYS_THRESHOLD: u32 = 4;

/// Default number of cached cycle boundaries
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// English month abbreviations, fixed so rendering never depends on locale
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Separator between the two dates of a span (ISO 8601 interval)
pub const SPAN_SEPARATOR: char = '/';
/// Separators accepted between quarter pattern entries
pub const PATTERN_SEPARATORS: [char; 2] = ['-', ','];

/// Default rendered width of one day column
pub const DEFAULT_COLUMN_WIDTH: usize = 2;
/// Default blank columns between months
pub const DEFAULT_MONTH_SPACING: usize = 3;
/// Default months laid out per row
pub const DEFAULT_MONTHS_PER_ROW: usize = 3;
/// Width of the `NN| ` week number gutter
pub const WEEK_NUMBER_GUTTER: usize = 4;
/// Week lines printed for every row of months
pub const WEEK_LINES_PER_ROW: usize = 5;
