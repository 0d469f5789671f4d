/// Number of cells in a calendar week row
pub const DAYS_PER_WEEK: usize = 7;

/// Number of months in a year; selector months are 0-indexed `0..MONTHS_PER_YEAR`
pub const MONTHS_PER_YEAR: u32 = 12;

/// 0-indexed month number for February
pub const FEBRUARY: u32 = 1;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u32 = 29;

/// Days in each month of a non-leap year (0-indexed months)
pub const DAYS_IN_MONTH: [u32; 12] = [
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Years divisible by this are leap years, subject to the two rules below
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Divisible by this: a common year after all
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// Divisible by this: a leap year again
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Maps a Sunday-first weekday (Sunday = 0) to a Monday-first column (Monday = 0)
pub const DAY_WEEK_NUMBER: [u32; 7] = [6, 0, 1, 2, 3, 4, 5];

/// Month names shown in the calendar's month selector
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Host value separator (`DD/MM/YYYY`)
pub const HOST_DATE_SEPARATOR: char = '/';

/// Attribute value that switches a marker attribute on
pub const MARKER_ENABLED: &str = "true";

/// Gap between the host field and a calendar opened to its right
pub const CALENDAR_RIGHT_GAP: f64 = 10.0;
/// Gap between the host field and a calendar opened below it
pub const CALENDAR_BOTTOM_GAP: f64 = 5.0;
/// Additional years offered after the current one
pub const DEFAULT_FUTURE_YEARS: i32 = 1;
/// Upper bound on the additional years, however large the configured value
pub const MAX_FUTURE_YEARS: i32 = 100;
/// Calendar header caption
pub const CALENDAR_HEADER_TEXT: &str = "Select a date";

/// Inner margin of the chart plot area
pub const CHART_PADDING: f64 = 20.0;
/// Radius of data point markers, also the hover hit radius
pub const CHART_POINT_RADIUS: f64 = 5.0;
/// Number of horizontal grid steps
pub const CHART_GRID_STEPS: u32 = 5;
/// Tooltip offset from the pointer
pub const CHART_TOOLTIP_OFFSET: f64 = 10.0;
