//! Sources of the current local time.
//!
//! Every date-dependent operation takes its notion of "now" from a [`Clock`]
//! so tests can pin the calendar.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Provides the current local date and time.
pub trait Clock: Send + Sync {
    /// Returns the current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Returns the current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Clock backed by the system's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that returns a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to midday of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_hms_opt(12, 0, 0).unwrap_or_default())
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_set_time() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);

        let later = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(0, 10, 0)
            .unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
        assert_eq!(clock.today(), later.date());
    }
}
