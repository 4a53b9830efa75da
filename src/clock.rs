//! Time source for day-grained bookkeeping.
//!
//! Streaks and quest deadlines are calendar based. The clock pairs the
//! current instant with the UTC offset that defines "today".

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, Utc};
use std::sync::Mutex;

/// Source of the current instant and the local calendar.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to derive local calendar dates.
    fn offset(&self) -> FixedOffset;

    /// Local calendar date of an instant.
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset()).date_naive()
    }

    /// Today's local calendar date.
    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }

    /// Local midnight `days_ahead` days after today, as a UTC instant.
    fn local_midnight(&self, days_ahead: i64) -> DateTime<Utc> {
        let date = self.today() + Duration::days(days_ahead);
        let local = date.and_time(NaiveTime::default());
        let utc = local - Duration::seconds(i64::from(self.offset().local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, Utc)
    }
}

/// Wall clock. Uses the system local offset unless one is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Create a clock that follows the system time zone.
    pub fn new() -> Self {
        Self { offset: None }
    }

    /// Create a clock pinned to a fixed offset in minutes east of UTC.
    ///
    /// Out-of-range offsets fall back to the system time zone.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        let offset = minutes.checked_mul(60).and_then(FixedOffset::east_opt);
        if offset.is_none() {
            tracing::warn!("Ignoring out-of-range UTC offset of {} minutes", minutes);
        }
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset.unwrap_or_else(|| Local::now().offset().fix())
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Create a clock frozen at `now`, with dates computed in UTC.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            offset: Utc.fix(),
        }
    }

    /// Use a different offset for calendar dates.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    /// Advance the clock.
    pub fn advance(&self, by: Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
