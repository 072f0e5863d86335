//! Wall-clock abstraction so the matcher can be driven by a manual clock in tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use parking_lot::Mutex;

/// Format used for every time-of-day comparison (`HH:MM`, 24-hour).
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + 'static {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current time-of-day as `HH:MM` in the given offset.
    ///
    /// The offset is applied exactly once, to UTC.
    fn time_of_day(&self, offset: FixedOffset) -> String {
        self.now()
            .with_timezone(&offset)
            .format(TIME_OF_DAY_FORMAT)
            .to_string()
    }
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. Cloning shares the underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock() = instant;
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.current.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
