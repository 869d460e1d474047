use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::dates::normalize;

/// A simple clock abstraction for deterministic "today" in services and tests.
///
/// Readings are local wall-clock time: every day boundary in this crate is
/// local midnight.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(NaiveDateTime),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given local timestamp.
    #[must_use]
    pub fn fixed(at: NaiveDateTime) -> Self {
        Self::Fixed(at)
    }

    /// Returns a clock fixed at local midnight of `day`.
    #[must_use]
    pub fn fixed_day(day: NaiveDate) -> Self {
        Self::Fixed(day.and_time(NaiveTime::MIN))
    }

    /// Returns the current local time according to the clock.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::Default => Local::now().naive_local(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Returns the current calendar day according to the clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        normalize(self.now())
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock represents real time.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Clock::Default)
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Returns a deterministic calendar day (2025-01-01) for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed day cannot be represented.
#[must_use]
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("fixed day should be valid")
}

/// Returns a deterministic local timestamp (2025-01-01 09:30) for tests.
///
/// # Panics
///
/// Panics if the fixed time of day cannot be represented.
#[must_use]
pub fn fixed_now() -> NaiveDateTime {
    fixed_today()
        .and_hms_opt(9, 30, 0)
        .expect("fixed time should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
