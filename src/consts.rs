/// Short date pattern (`MM/dd/yyyy`), e.g. `04/29/1992`
pub const SHORT_DATE_ONLY: &str = "MM/dd/yyyy";
/// Long date pattern (`MMMM dd, yyyy`), e.g. `April 29, 1992`
pub const LONG_DATE_ONLY: &str = "MMMM dd, yyyy";
/// Short time pattern (`hh:mm a`), e.g. `07:30 AM`
pub const SHORT_TIME_ONLY: &str = "hh:mm a";
/// Long time pattern (`HH:mm:ss`), e.g. `13:24:03`
pub const LONG_TIME_ONLY: &str = "HH:mm:ss";
/// Short date and time, e.g. `04/29/1992 07:30 AM`
pub const SHORT_DATE_TIME: &str = const_str::concat!(SHORT_DATE_ONLY, " ", SHORT_TIME_ONLY);
/// Long date and time, e.g. `April 29, 1992 13:30:04`
pub const LONG_DATE_TIME: &str = const_str::concat!(LONG_DATE_ONLY, " ", LONG_TIME_ONLY);

/// Pattern a freshly constructed helper formats and parses with
pub const DEFAULT_PATTERN: &str = SHORT_DATE_TIME;

/// Number of values in a breakdown
pub const BREAK_DOWN_UNITS: usize = 6;

/// Index of the years value in a breakdown array
pub const YEARS_IN_ARRAY: usize = 0;
/// Index of the months value in a breakdown array
pub const MONTHS_IN_ARRAY: usize = 1;
/// Index of the days value in a breakdown array
pub const DAYS_IN_ARRAY: usize = 2;
/// Index of the hours value in a breakdown array
pub const HOURS_IN_ARRAY: usize = 3;
/// Index of the minutes value in a breakdown array
pub const MINUTES_IN_ARRAY: usize = 4;
/// Index of the seconds value in a breakdown array
pub const SECONDS_IN_ARRAY: usize = 5;

/// First valid day of a month
pub const MIN_DAY_OF_MONTH: u8 = 1;
/// Last day any month can have
pub const MAX_DAY_OF_MONTH: u8 = 31;

pub(crate) const MONTHS_PER_YEAR: i64 = 12;
pub(crate) const MONTHS_PER_DECADE: i64 = 10 * MONTHS_PER_YEAR;
pub(crate) const MONTHS_PER_CENTURY: i64 = 100 * MONTHS_PER_YEAR;
pub(crate) const MONTHS_PER_MILLENNIUM: i64 = 1000 * MONTHS_PER_YEAR;
pub(crate) const DAYS_PER_WEEK: i64 = 7;
pub(crate) const HOURS_PER_HALF_DAY: i64 = 12;

/// Packing factor for (month, day) comparisons; larger than any day of month
pub(crate) const DAY_PACKING: i64 = 32;

