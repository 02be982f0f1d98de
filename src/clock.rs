//! Time source for document timestamps.
//!
//! Every timestamp the engine writes (`time.modified`, `time.created`,
//! per-version publish times, `time.unpublished`) comes from a [`Clock`].
//! The engine reads the clock once per invocation, so all timestamps written
//! by one update are identical and a replay with a [`FixedClock`] is
//! byte-for-byte deterministic.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of ISO-8601 UTC timestamps.
pub trait Clock {
    /// Current time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    fn now(&self) -> String;
}

// ---------------------------------------------------------------------------
// SystemClock
// ---------------------------------------------------------------------------

/// Wall-clock time from [`SystemTime`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        format_unix_millis(millis)
    }
}

// ---------------------------------------------------------------------------
// FixedClock
// ---------------------------------------------------------------------------

/// A clock that always returns the same instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedClock(String);

impl FixedClock {
    /// Create a clock pinned to `timestamp`.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }

    /// Create a clock pinned to a Unix time in milliseconds.
    #[must_use]
    pub fn at_unix_millis(millis: u64) -> Self {
        Self(format_unix_millis(millis))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> String {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format milliseconds since the Unix epoch as an ISO-8601 UTC string.
#[must_use]
pub fn format_unix_millis(millis: u64) -> String {
    let ms = millis % 1000;
    let s = millis / 1000;
    let sec = s % 60;
    let min = (s / 60) % 60;
    let hour = (s / 3600) % 24;
    let (year, month, day) = days_to_ymd(s / 86400);

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}.{ms:03}Z")
}

/// Convert days since 1970-01-01 to a proleptic Gregorian (year, month, day).
const fn days_to_ymd(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468; // shift epoch to 0000-03-01
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
