//! Sources for "today" used by searches that start from the current date.

use chrono::{Local, NaiveDate};

use crate::prelude::*;

/// Supplies the current calendar date.
pub trait Clock {
    /// Today's date in whatever calendar context the clock represents
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deref, From, Into)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let date = NaiveDate::from_ymd_opt(2017, 11, 6).unwrap();
        let clock = FixedClock::from(date);
        assert_eq!(clock.today(), date);
        assert_eq!(*clock, date);
        assert_eq!(NaiveDate::from(clock), date);
    }

    #[test]
    fn test_clock_by_reference() {
        let date = NaiveDate::from_ymd_opt(2017, 11, 6).unwrap();
        let clock = FixedClock::new(date);
        fn read<C: Clock>(clock: C) -> NaiveDate {
            clock.today()
        }
        assert_eq!(read(&clock), date);
        let dynamic: &dyn Clock = &clock;
        assert_eq!(read(dynamic), date);
    }

    #[test]
    fn test_system_clock_is_near_local_now() {
        let before = Local::now().date_naive();
        let today = SystemClock.today();
        let after = Local::now().date_naive();
        assert!(before <= today && today <= after);
    }
}
