use crate::DateError;
use crate::consts::{
    BREAK_DOWN_UNITS, DAY_PACKING, DAYS_IN_ARRAY, DAYS_PER_WEEK, HOURS_IN_ARRAY,
    HOURS_PER_HALF_DAY, MAX_DAY_OF_MONTH, MIN_DAY_OF_MONTH, MINUTES_IN_ARRAY, MONTHS_IN_ARRAY,
    MONTHS_PER_CENTURY, MONTHS_PER_DECADE, MONTHS_PER_MILLENNIUM, MONTHS_PER_YEAR,
    SECONDS_IN_ARRAY, YEARS_IN_ARRAY,
};
use crate::prelude::*;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;

/// A calendar or clock unit that can be measured between two timestamps
/// and added to a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Unit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
    Weeks,
    Months,
    Years,
    Decades,
    Centuries,
    Millennia,
    Eras,
    /// Conceptually infinite; never measurable between two timestamps
    Forever,
}

impl Unit {
    /// Returns true for units whose length depends on the calendar
    /// (days and above) rather than a fixed number of nanoseconds.
    pub const fn is_date_based(self) -> bool {
        matches!(
            self,
            Self::Days
                | Self::Weeks
                | Self::Months
                | Self::Years
                | Self::Decades
                | Self::Centuries
                | Self::Millennia
                | Self::Eras
        )
    }

    /// Counts whole units from `from` to `to`, truncating toward zero.
    ///
    /// The result is negative when `to` is before `from`. Calendar units pull
    /// the end date back by a day when the end time-of-day has not yet reached
    /// the start time-of-day, so a month is only counted once it has fully
    /// elapsed.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`,
    /// or `DateError::UnsupportedUnit` for `Unit::Forever`.
    pub fn between(self, from: &NaiveDateTime, to: &NaiveDateTime) -> Result<i64, DateError> {
        if self == Self::Forever {
            return Err(DateError::UnsupportedUnit(self));
        }
        if self.is_date_based() {
            Ok(self.dates_between(from, to))
        } else {
            self.time_between(*to - *from)
        }
    }

    /// Calendar units, measured on dates after adjusting for time of day.
    fn dates_between(self, from: &NaiveDateTime, to: &NaiveDateTime) -> i64 {
        let end = adjusted_end_date(from, to);
        let start = from.date();
        match self {
            Self::Days => end.signed_duration_since(start).num_days(),
            Self::Weeks => end.signed_duration_since(start).num_days() / DAYS_PER_WEEK,
            Self::Months => months_until(start, end),
            Self::Years => months_until(start, end) / MONTHS_PER_YEAR,
            Self::Decades => months_until(start, end) / MONTHS_PER_DECADE,
            Self::Centuries => months_until(start, end) / MONTHS_PER_CENTURY,
            Self::Millennia => months_until(start, end) / MONTHS_PER_MILLENNIUM,
            Self::Eras => era(end) - era(start),
            _ => 0,
        }
    }

    /// Fixed-length units, measured on the exact elapsed time.
    fn time_between(self, delta: TimeDelta) -> Result<i64, DateError> {
        match self {
            Self::Nanos => delta.num_nanoseconds().ok_or(DateError::Overflow),
            Self::Micros => delta.num_microseconds().ok_or(DateError::Overflow),
            Self::Millis => Ok(delta.num_milliseconds()),
            Self::Seconds => Ok(delta.num_seconds()),
            Self::Minutes => Ok(delta.num_minutes()),
            Self::Hours => Ok(delta.num_hours()),
            Self::HalfDays => Ok(delta.num_hours() / HOURS_PER_HALF_DAY),
            _ => Ok(0),
        }
    }

    /// Adds `amount` of this unit to `datetime`.
    ///
    /// Month based units clamp the day to the last valid day of the
    /// resulting month (January 31st plus one month is February 28th or 29th).
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the result is outside chrono's
    /// representable range, or `DateError::UnsupportedUnit` for `Unit::Eras`
    /// and `Unit::Forever`.
    pub fn add_to(self, datetime: &NaiveDateTime, amount: i64) -> Result<NaiveDateTime, DateError> {
        let delta = match self {
            Self::Nanos => Some(TimeDelta::nanoseconds(amount)),
            Self::Micros => Some(TimeDelta::microseconds(amount)),
            Self::Millis => TimeDelta::try_milliseconds(amount),
            Self::Seconds => TimeDelta::try_seconds(amount),
            Self::Minutes => TimeDelta::try_minutes(amount),
            Self::Hours => TimeDelta::try_hours(amount),
            Self::HalfDays => amount
                .checked_mul(HOURS_PER_HALF_DAY)
                .and_then(TimeDelta::try_hours),
            Self::Days => TimeDelta::try_days(amount),
            Self::Weeks => TimeDelta::try_weeks(amount),
            Self::Months => return add_months(datetime, amount, 1),
            Self::Years => return add_months(datetime, amount, MONTHS_PER_YEAR),
            Self::Decades => return add_months(datetime, amount, MONTHS_PER_DECADE),
            Self::Centuries => return add_months(datetime, amount, MONTHS_PER_CENTURY),
            Self::Millennia => return add_months(datetime, amount, MONTHS_PER_MILLENNIUM),
            Self::Eras | Self::Forever => return Err(DateError::UnsupportedUnit(self)),
        };

        delta
            .and_then(|delta| datetime.checked_add_signed(delta))
            .ok_or(DateError::Overflow)
    }
}

// --- calendar arithmetic helpers ---

/// End date adjusted so a partial final day is not counted.
fn adjusted_end_date(from: &NaiveDateTime, to: &NaiveDateTime) -> NaiveDate {
    let start = from.date();
    let end = to.date();
    if end > start && to.time() < from.time() {
        end.pred_opt().unwrap_or(end)
    } else if end < start && to.time() > from.time() {
        end.succ_opt().unwrap_or(end)
    } else {
        end
    }
}

fn proleptic_month(date: NaiveDate) -> i64 {
    i64::from(date.year()) * MONTHS_PER_YEAR + i64::from(date.month0())
}

/// Whole months between two dates.
fn months_until(start: NaiveDate, end: NaiveDate) -> i64 {
    let packed_start = proleptic_month(start) * DAY_PACKING + i64::from(start.day());
    let packed_end = proleptic_month(end) * DAY_PACKING + i64::from(end.day());
    (packed_end - packed_start) / DAY_PACKING
}

/// 1 for the common era, 0 before it
fn era(date: NaiveDate) -> i64 {
    i64::from(date.year() >= 1)
}

fn add_months(datetime: &NaiveDateTime, amount: i64, factor: i64) -> Result<NaiveDateTime, DateError> {
    let months = amount.checked_mul(factor).ok_or(DateError::Overflow)?;
    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| DateError::Overflow)?;
    let shifted = if months >= 0 {
        datetime.checked_add_months(Months::new(magnitude))
    } else {
        datetime.checked_sub_months(Months::new(magnitude))
    };
    shifted.ok_or(DateError::Overflow)
}

/// A day-of-month value guaranteed to be in the range `1..=31`.
///
/// Not tied to any particular month, so 31 is valid even though
/// some months never reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfMonth(NonZeroU8);

impl DayOfMonth {
    /// Creates a new `DayOfMonth`, validating that it's non-zero and <= `MAX_DAY_OF_MONTH`
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if the value is 0 or > `MAX_DAY_OF_MONTH`.
    pub fn new(value: u8) -> Result<Self, DateError> {
        let invalid = || {
            DateError::InvalidArgument(format!(
                "Day of month must be between {MIN_DAY_OF_MONTH}-{MAX_DAY_OF_MONTH} inclusive, got {value}"
            ))
        };
        if !(MIN_DAY_OF_MONTH..=MAX_DAY_OF_MONTH).contains(&value) {
            return Err(invalid());
        }
        NonZeroU8::new(value).map(Self).ok_or_else(invalid)
    }

    /// Returns the day value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Returns true if `date` falls on this day of its month
    pub fn matches(self, date: NaiveDate) -> bool {
        date.day() == u32::from(self.get())
    }
}

impl TryFrom<u8> for DayOfMonth {
    type Error = DateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfMonth> for u8 {
    fn from(day: DayOfMonth) -> Self {
        day.0.get()
    }
}

impl fmt::Display for DayOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An interval split into years, months, days, hours, minutes and seconds.
///
/// Each value is the remainder left after the coarser units were added, so
/// adding them back in order to the earlier timestamp reproduces the later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[display(
    fmt = "{years} Years, {months} Months, {days} Days, {hours} Hours, {minutes} Minutes, {seconds} Seconds"
)]
pub struct Breakdown {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Breakdown {
    /// Units in the order they are measured and re-applied
    pub const UNITS: [Unit; BREAK_DOWN_UNITS] = [
        Unit::Years,
        Unit::Months,
        Unit::Days,
        Unit::Hours,
        Unit::Minutes,
        Unit::Seconds,
    ];

    /// Breaks the interval between two timestamps down, earliest first.
    ///
    /// Operand order does not matter; the later timestamp is always measured
    /// from the earlier one, so every value is non-negative.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if a count or an intermediate timestamp
    /// leaves the representable range.
    pub fn between(a: &NaiveDateTime, b: &NaiveDateTime) -> Result<Self, DateError> {
        let (from, to) = if a > b { (b, a) } else { (a, b) };

        let mut cursor = *from;
        let mut values = [0; BREAK_DOWN_UNITS];
        for (value, unit) in values.iter_mut().zip(Self::UNITS) {
            *value = unit.between(&cursor, to)?;
            cursor = unit.add_to(&cursor, *value)?;
        }

        Ok(Self::from(values))
    }

    /// Adds each value to `datetime` in order: years first, seconds last.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if any step leaves the representable range.
    pub fn apply_to(&self, datetime: &NaiveDateTime) -> Result<NaiveDateTime, DateError> {
        Self::UNITS
            .into_iter()
            .zip(self.to_array())
            .try_fold(*datetime, |cursor, (unit, amount)| unit.add_to(&cursor, amount))
    }

    /// Values in `[years, months, days, hours, minutes, seconds]` order
    pub const fn to_array(&self) -> [i64; BREAK_DOWN_UNITS] {
        [
            self.years,
            self.months,
            self.days,
            self.hours,
            self.minutes,
            self.seconds,
        ]
    }

    /// Value at one of the `*_IN_ARRAY` indices
    pub const fn get(&self, index: usize) -> Option<i64> {
        match index {
            YEARS_IN_ARRAY => Some(self.years),
            MONTHS_IN_ARRAY => Some(self.months),
            DAYS_IN_ARRAY => Some(self.days),
            HOURS_IN_ARRAY => Some(self.hours),
            MINUTES_IN_ARRAY => Some(self.minutes),
            SECONDS_IN_ARRAY => Some(self.seconds),
            _ => None,
        }
    }
}

impl From<[i64; BREAK_DOWN_UNITS]> for Breakdown {
    fn from(values: [i64; BREAK_DOWN_UNITS]) -> Self {
        let [years, months, days, hours, minutes, seconds] = values;
        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        }
    }
}

impl From<Breakdown> for [i64; BREAK_DOWN_UNITS] {
    fn from(breakdown: Breakdown) -> Self {
        breakdown.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn test_day_of_month_new_valid() {
        assert!(DayOfMonth::new(1).is_ok());
        assert!(DayOfMonth::new(15).is_ok());
        assert!(DayOfMonth::new(31).is_ok());
    }

    #[test]
    fn test_day_of_month_new_invalid() {
        assert!(matches!(
            DayOfMonth::new(0),
            Err(DateError::InvalidArgument(_))
        ));
        assert!(matches!(
            DayOfMonth::new(32),
            Err(DateError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_day_of_month_error_names_bounds() {
        let err = DayOfMonth::new(32).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: Day of month must be between 1-31 inclusive, got 32"
        );
        let err = DayOfMonth::new(0).unwrap_err();
        assert!(err.to_string().contains("between 1-31"));
    }

    #[test]
    fn test_day_of_month_matches() {
        let thirteenth = DayOfMonth::new(13).unwrap();
        assert!(thirteenth.matches(NaiveDate::from_ymd_opt(2018, 4, 13).unwrap()));
        assert!(!thirteenth.matches(NaiveDate::from_ymd_opt(2018, 4, 14).unwrap()));
    }

    #[test]
    fn test_day_of_month_serde_validation() {
        let day: DayOfMonth = serde_json::from_str("13").unwrap();
        assert_eq!(day.get(), 13);
        assert_eq!(serde_json::to_string(&day).unwrap(), "13");

        assert!(serde_json::from_str::<DayOfMonth>("0").is_err());
        assert!(serde_json::from_str::<DayOfMonth>("32").is_err());
    }

    #[test]
    fn test_months_require_full_day_and_time() {
        let from = dt(2017, 1, 15, 12, 0, 0);
        assert_eq!(Unit::Months.between(&from, &dt(2017, 2, 15, 11, 59, 59)).unwrap(), 0);
        assert_eq!(Unit::Months.between(&from, &dt(2017, 2, 15, 12, 0, 0)).unwrap(), 1);
        assert_eq!(Unit::Months.between(&from, &dt(2017, 2, 14, 23, 0, 0)).unwrap(), 0);
    }

    #[test]
    fn test_negative_counts_truncate_toward_zero() {
        let from = dt(2017, 2, 15, 12, 0, 0);
        let to = dt(2017, 1, 15, 12, 0, 1);
        assert_eq!(Unit::Months.between(&from, &to).unwrap(), 0);
        assert_eq!(Unit::Days.between(&from, &to).unwrap(), -30);
        assert_eq!(Unit::Hours.between(&from, &to).unwrap(), -743);
    }

    #[test]
    fn test_years_across_leap_day() {
        let leap = dt(2020, 2, 29, 0, 0, 0);
        assert_eq!(Unit::Years.between(&leap, &dt(2021, 2, 28, 0, 0, 0)).unwrap(), 0);
        assert_eq!(Unit::Years.between(&leap, &dt(2021, 3, 1, 0, 0, 0)).unwrap(), 1);
    }

    #[test]
    fn test_coarse_units() {
        let from = dt(1900, 1, 1, 0, 0, 0);
        let to = dt(2017, 11, 6, 0, 0, 0);
        assert_eq!(Unit::Decades.between(&from, &to).unwrap(), 11);
        assert_eq!(Unit::Centuries.between(&from, &to).unwrap(), 1);
        assert_eq!(Unit::Millennia.between(&from, &to).unwrap(), 0);
        assert_eq!(Unit::Weeks.between(&from, &dt(1900, 1, 15, 0, 0, 0)).unwrap(), 2);
        assert_eq!(Unit::HalfDays.between(&from, &dt(1900, 1, 2, 11, 0, 0)).unwrap(), 2);
    }

    #[test]
    fn test_eras() {
        let bce = dt(-5, 6, 1, 0, 0, 0);
        let ce = dt(5, 6, 1, 0, 0, 0);
        assert_eq!(Unit::Eras.between(&bce, &ce).unwrap(), 1);
        assert_eq!(Unit::Eras.between(&ce, &dt(2017, 1, 1, 0, 0, 0)).unwrap(), 0);
    }

    #[test]
    fn test_forever_is_unsupported() {
        let t = dt(2017, 11, 6, 21, 0, 0);
        assert!(matches!(
            Unit::Forever.between(&t, &t),
            Err(DateError::UnsupportedUnit(Unit::Forever))
        ));
        assert!(matches!(
            Unit::Forever.add_to(&t, 1),
            Err(DateError::UnsupportedUnit(Unit::Forever))
        ));
        assert!(matches!(
            Unit::Eras.add_to(&t, 1),
            Err(DateError::UnsupportedUnit(Unit::Eras))
        ));
    }

    #[test]
    fn test_nanos_overflow() {
        let from = NaiveDateTime::MIN;
        let to = NaiveDateTime::MAX;
        assert!(matches!(Unit::Nanos.between(&from, &to), Err(DateError::Overflow)));
        assert!(matches!(Unit::Micros.between(&from, &to), Err(DateError::Overflow)));
        assert!(Unit::Seconds.between(&from, &to).is_ok());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let jan31 = dt(2017, 1, 31, 8, 0, 0);
        assert_eq!(Unit::Months.add_to(&jan31, 1).unwrap(), dt(2017, 2, 28, 8, 0, 0));
        assert_eq!(Unit::Months.add_to(&jan31, -2).unwrap(), dt(2016, 11, 30, 8, 0, 0));
        assert_eq!(Unit::Years.add_to(&dt(2020, 2, 29, 0, 0, 0), 1).unwrap(), dt(2021, 2, 28, 0, 0, 0));
    }

    #[test]
    fn test_add_overflow() {
        assert!(matches!(
            Unit::Years.add_to(&NaiveDateTime::MAX, 1),
            Err(DateError::Overflow)
        ));
        assert!(matches!(
            Unit::Months.add_to(&dt(2017, 1, 1, 0, 0, 0), i64::MAX),
            Err(DateError::Overflow)
        ));
        assert!(matches!(
            Unit::Seconds.add_to(&dt(2017, 1, 1, 0, 0, 0), i64::MAX),
            Err(DateError::Overflow)
        ));
    }

    #[test]
    fn test_breakdown_example() {
        let breakdown =
            Breakdown::between(&dt(1992, 4, 29, 7, 30, 0), &dt(2017, 11, 6, 21, 0, 0)).unwrap();
        assert_eq!(breakdown.to_array(), [25, 6, 8, 13, 30, 0]);
        assert_eq!(
            breakdown.to_string(),
            "25 Years, 6 Months, 8 Days, 13 Hours, 30 Minutes, 0 Seconds"
        );
    }

    #[test]
    fn test_breakdown_month_end_borrow() {
        let from = dt(2017, 1, 31, 10, 0, 0);
        let to = dt(2017, 3, 1, 10, 30, 15);
        let breakdown = Breakdown::between(&from, &to).unwrap();
        assert_eq!(breakdown.to_array(), [0, 1, 1, 0, 30, 15]);
        assert_eq!(breakdown.apply_to(&from).unwrap(), to);

        // Short of the month boundary by time of day: counted as days instead
        let to = dt(2017, 3, 1, 9, 15, 30);
        let breakdown = Breakdown::between(&from, &to).unwrap();
        assert_eq!(breakdown.to_array(), [0, 0, 28, 23, 15, 30]);
        assert_eq!(breakdown.apply_to(&from).unwrap(), to);
    }

    #[test]
    fn test_breakdown_indices() {
        let breakdown = Breakdown::from([1, 2, 3, 4, 5, 6]);
        assert_eq!(breakdown.get(YEARS_IN_ARRAY), Some(1));
        assert_eq!(breakdown.get(MONTHS_IN_ARRAY), Some(2));
        assert_eq!(breakdown.get(DAYS_IN_ARRAY), Some(3));
        assert_eq!(breakdown.get(HOURS_IN_ARRAY), Some(4));
        assert_eq!(breakdown.get(MINUTES_IN_ARRAY), Some(5));
        assert_eq!(breakdown.get(SECONDS_IN_ARRAY), Some(6));
        assert_eq!(breakdown.get(BREAK_DOWN_UNITS), None);
        assert_eq!(<[i64; 6]>::from(breakdown), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_breakdown_display_no_plural_adjustment() {
        let breakdown = Breakdown::from([1, 1, 1, 1, 1, 1]);
        assert_eq!(
            breakdown.to_string(),
            "1 Years, 1 Months, 1 Days, 1 Hours, 1 Minutes, 1 Seconds"
        );
    }

    #[test]
    fn test_breakdown_serde() {
        let breakdown = Breakdown::from([25, 6, 8, 13, 30, 0]);
        let json = serde_json::to_string(&breakdown).unwrap();
        assert_eq!(
            json,
            r#"{"years":25,"months":6,"days":8,"hours":13,"minutes":30,"seconds":0}"#
        );
        let parsed: Breakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, breakdown);
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(Unit::Years.to_string(), "Years");
        assert_eq!(Unit::HalfDays.to_string(), "HalfDays");
    }

    #[test]
    fn test_date_based_units_ignore_partial_days() {
        // 47 hours elapsed, but the second day is not complete by time of day
        let from = dt(2017, 1, 1, 12, 0, 0);
        let to = dt(2017, 1, 3, 11, 0, 0);
        assert!(Unit::Days.is_date_based());
        assert_eq!(Unit::Days.between(&from, &to).unwrap(), 1);
        assert!(!Unit::Hours.is_date_based());
        assert_eq!(Unit::Hours.between(&from, &to).unwrap(), 47);
        assert_eq!(Unit::HalfDays.between(&from, &to).unwrap(), 3);
        assert_eq!(Unit::Days.between(&to, &from).unwrap(), -1);
    }

    #[test]
    fn test_unit_is_date_based() {
        assert!(Unit::Days.is_date_based());
        assert!(Unit::Eras.is_date_based());
        assert!(!Unit::Hours.is_date_based());
        assert!(!Unit::Forever.is_date_based());
    }
}
