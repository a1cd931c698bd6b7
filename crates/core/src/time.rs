use chrono::{DateTime, Duration, Local, Utc};

use crate::model::LoggedAt;

/// A simple clock abstraction for deterministic time in services and tests.
///
/// Entry timestamps are local wall-clock time, so the default clock reads the
/// system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(LoggedAt),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: LoggedAt) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock, truncated to seconds.
    #[must_use]
    pub fn now(&self) -> LoggedAt {
        match self {
            Clock::Default => LoggedAt::new(Local::now().naive_local()),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t = LoggedAt::new(t.value() + delta);
        }
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14 22:13:20).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `LoggedAt` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> LoggedAt {
    let at = DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
        .naive_utc();
    LoggedAt::new(at)
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
