mod clock;
mod consts;
mod pattern;
mod prelude;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use consts::*;
pub use pattern::{Pattern, PatternError};
pub use types::{Breakdown, DayOfMonth, Unit};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Error type for every helper operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// A required input was empty or out of range, or a pattern was malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A count or intermediate date left the representable range.
    #[error("Numeric overflow in date arithmetic")]
    Overflow,

    /// The unit cannot be measured between two timestamps.
    #[error("Unsupported unit: {0}")]
    UnsupportedUnit(Unit),

    /// Text did not match a valid pattern.
    #[error("Could not parse date-time: {0}")]
    Parse(String),
}

impl From<PatternError> for DateError {
    fn from(err: PatternError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Convenience operations over chrono's naive date and date-time types:
/// unit differences, calendar breakdowns, weekday searches and formatting
/// with a configurable default pattern.
///
/// The default pattern is the only state. It starts as `SHORT_DATE_TIME`
/// and changes only through [`DateHelper::set_default_pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateHelper {
    default_pattern: Pattern,
}

impl DateHelper {
    /// Creates a helper using `DEFAULT_PATTERN`
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a helper with a different default pattern
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if the pattern is empty or malformed.
    pub fn with_default_pattern(pattern: &str) -> Result<Self, DateError> {
        Ok(Self {
            default_pattern: Pattern::new(pattern)?,
        })
    }

    /// Replaces the default pattern used by [`Self::format_default`] and
    /// [`Self::parse_default`].
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if the pattern is empty or malformed.
    /// The previous default is kept on error.
    pub fn set_default_pattern(&mut self, pattern: &str) -> Result<(), DateError> {
        let pattern = Pattern::new(pattern)?;
        tracing::debug!(old = %self.default_pattern, new = %pattern, "Default pattern changed");
        self.default_pattern = pattern;
        Ok(())
    }

    /// The current default pattern
    pub fn default_pattern(&self) -> &str {
        self.default_pattern.as_str()
    }
}

#[allow(clippy::unused_self)]
impl DateHelper {
    /// Whole `unit`s between two timestamps, in either order.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`,
    /// or `DateError::UnsupportedUnit` if the unit cannot be measured.
    pub fn units_between(
        &self,
        a: &NaiveDateTime,
        b: &NaiveDateTime,
        unit: Unit,
    ) -> Result<i64, DateError> {
        let (from, to) = if a > b {
            tracing::trace!(%a, %b, "Swapping operands so the earlier comes first");
            (b, a)
        } else {
            (a, b)
        };
        unit.between(from, to)
    }

    /// Whole years between two timestamps, in either order.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`.
    pub fn years_between(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> Result<i64, DateError> {
        self.units_between(a, b, Unit::Years)
    }

    /// Whole months between two timestamps, in either order.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`.
    pub fn months_between(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> Result<i64, DateError> {
        self.units_between(a, b, Unit::Months)
    }

    /// Whole days between two timestamps, in either order.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`.
    pub fn days_between(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> Result<i64, DateError> {
        self.units_between(a, b, Unit::Days)
    }

    /// Whole hours between two timestamps, in either order.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`.
    pub fn hours_between(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> Result<i64, DateError> {
        self.units_between(a, b, Unit::Hours)
    }

    /// Whole minutes between two timestamps, in either order.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if the count does not fit in an `i64`.
    pub fn minutes_between(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> Result<i64, DateError> {
        self.units_between(a, b, Unit::Minutes)
    }

    /// Years, months, days, hours, minutes and seconds between two
    /// timestamps, in either order.
    ///
    /// Each unit is measured from a cursor that has already been advanced by
    /// every coarser unit, so re-adding the values in order to the earlier
    /// timestamp lands exactly on the later one.
    ///
    /// # Errors
    /// Returns `DateError::Overflow` if a count or intermediate value leaves
    /// the representable range.
    pub fn breakdown(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> Result<Breakdown, DateError> {
        Breakdown::between(a, b)
    }

    /// [`Self::breakdown`] rendered as
    /// `"<y> Years, <mo> Months, <d> Days, <h> Hours, <mi> Minutes, <s> Seconds"`.
    ///
    /// # Errors
    /// Same as [`Self::breakdown`].
    pub fn breakdown_as_string(
        &self,
        a: &NaiveDateTime,
        b: &NaiveDateTime,
    ) -> Result<String, DateError> {
        Ok(self.breakdown(a, b)?.to_string())
    }

    /// Finds the first date strictly after `start` that falls on `weekday`
    /// and on the given day of the month.
    ///
    /// Months too short to contain the day are skipped.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if `day_of_month` is outside
    /// `1..=31`, or `DateError::Overflow` if the search runs past the last
    /// representable date.
    pub fn next_weekday_on_day_of_month(
        &self,
        start: NaiveDate,
        weekday: Weekday,
        day_of_month: u8,
    ) -> Result<NaiveDate, DateError> {
        let target = DayOfMonth::new(day_of_month)?;

        let mut candidate = start;
        let mut steps: u32 = 0;
        loop {
            candidate = next_weekday(candidate, weekday).ok_or(DateError::Overflow)?;
            steps += 1;
            if target.matches(candidate) {
                tracing::trace!(
                    %start,
                    %weekday,
                    day = %target,
                    %candidate,
                    steps,
                    "Found weekday on day of month"
                );
                return Ok(candidate);
            }
        }
    }

    /// [`Self::next_weekday_on_day_of_month`] starting from `clock`'s today.
    ///
    /// # Errors
    /// Same as [`Self::next_weekday_on_day_of_month`].
    pub fn next_weekday_on_day_of_month_from_today<C: Clock + ?Sized>(
        &self,
        clock: &C,
        weekday: Weekday,
        day_of_month: u8,
    ) -> Result<NaiveDate, DateError> {
        self.next_weekday_on_day_of_month(clock.today(), weekday, day_of_month)
    }

    /// Formats a timestamp with an explicit pattern.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if the pattern is empty or malformed.
    pub fn format(&self, datetime: &NaiveDateTime, pattern: &str) -> Result<String, DateError> {
        Pattern::new(pattern)?.format(datetime)
    }

    /// Parses text with an explicit pattern.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if the text or pattern is empty or
    /// the pattern is malformed, and `DateError::Parse` if the text does not
    /// match.
    pub fn parse(&self, text: &str, pattern: &str) -> Result<NaiveDateTime, DateError> {
        if text.is_empty() {
            return Err(DateError::InvalidArgument(
                "Text to parse may not be empty".to_owned(),
            ));
        }
        Pattern::new(pattern)?.parse(text)
    }
}

impl DateHelper {
    /// Formats a timestamp with the default pattern.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if chrono cannot render a field.
    pub fn format_default(&self, datetime: &NaiveDateTime) -> Result<String, DateError> {
        self.default_pattern.format(datetime)
    }

    /// Parses text with the default pattern.
    ///
    /// # Errors
    /// Returns `DateError::InvalidArgument` if the text is empty, and
    /// `DateError::Parse` if it does not match.
    pub fn parse_default(&self, text: &str) -> Result<NaiveDateTime, DateError> {
        self.default_pattern.parse(text)
    }
}

/// The next `weekday` strictly after `date`
fn next_weekday(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let current = date.weekday().num_days_from_monday();
    let wanted = weekday.num_days_from_monday();
    let ahead = match (7 + wanted - current) % 7 {
        0 => 7,
        n => n,
    };
    date.checked_add_days(Days::new(u64::from(ahead)))
}
