//! Clock abstraction consumed by time-dependent derivations.
//!
//! # Responsibility
//! - Provide "now" to overview, habit-period and overdue computations.
//! - Convert stored epoch-millisecond timestamps to calendar values.
//!
//! # Invariants
//! - All calendar boundaries (day, month, year) are evaluated in UTC.

use chrono::{DateTime, NaiveDate, Utc};
use std::cell::Cell;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as Unix epoch milliseconds.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Current UTC calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic callers and tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now_ms: Cell<i64>,
}

impl FixedClock {
    /// Creates a clock frozen at `epoch_ms`.
    pub fn at_ms(epoch_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(epoch_ms),
        }
    }

    /// Creates a clock frozen at midday UTC of the given date.
    ///
    /// Falls back to the Unix epoch for dates outside chrono's range.
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        Self::at_ms(ms_from_date(year, month, day).unwrap_or(0))
    }

    pub fn set_ms(&self, epoch_ms: i64) {
        self.now_ms.set(epoch_ms);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_ms(days.saturating_mul(MS_PER_DAY));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        datetime_from_ms(self.now_ms.get()).unwrap_or_default()
    }

    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Converts epoch milliseconds into a UTC instant.
///
/// Returns `None` when the value is outside the representable calendar range.
pub fn datetime_from_ms(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
}

/// Converts epoch milliseconds into the UTC calendar day containing them.
pub fn day_from_ms(epoch_ms: i64) -> Option<NaiveDate> {
    datetime_from_ms(epoch_ms).map(|instant| instant.date_naive())
}

/// Epoch milliseconds of midday UTC on the given date, for building fixtures
/// and form input.
pub fn ms_from_date(year: i32, month: u32, day: u32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}
