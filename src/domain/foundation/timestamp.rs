//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    ///
    /// Truncated to microseconds, the precision Postgres keeps, so values
    /// compare equal after a storage round trip.
    pub fn now() -> Self {
        Self(Utc::now()).truncated_to_micros()
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of hours.
    pub fn plus_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// Creates a new timestamp by adding the specified number of days.
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by subtracting the specified number of days.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of milliseconds.
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Creates a new timestamp by adding the specified number of microseconds.
    pub fn plus_micros(&self, micros: i64) -> Self {
        Self(self.0 + Duration::microseconds(micros))
    }

    /// Whole days elapsed between `earlier` and this timestamp.
    pub fn days_since(&self, earlier: &Timestamp) -> i64 {
        self.duration_since(earlier).num_days()
    }

    /// Microseconds since the Unix epoch.
    ///
    /// Postgres stores timestamps at microsecond precision, so this is the
    /// resolution used for pagination cursors.
    pub fn as_unix_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// Creates a timestamp from microseconds since the Unix epoch.
    pub fn from_unix_micros(micros: i64) -> Option<Self> {
        Utc.timestamp_micros(micros).single().map(Self)
    }

    /// Milliseconds since the Unix epoch.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Truncates to microsecond precision to match what storage round-trips.
    pub fn truncated_to_micros(&self) -> Self {
        Utc.timestamp_micros(self.as_unix_micros())
            .single()
            .map(Self)
            .unwrap_or(*self)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Timestamp::from_datetime(Utc::now()).truncated_to_micros();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts >= before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn plus_hours_moves_forward() {
        let ts = Timestamp::now();
        let later = ts.plus_hours(24);
        assert!(later.is_after(&ts));
        assert_eq!(later.duration_since(&ts), Duration::hours(24));
    }

    #[test]
    fn days_since_counts_whole_days() {
        let ts = Timestamp::now();
        assert_eq!(ts.days_since(&ts.minus_days(3)), 3);
        assert_eq!(ts.days_since(&ts.plus_hours(-5)), 0);
    }

    #[test]
    fn unix_micros_round_trip() {
        let ts = Timestamp::now().truncated_to_micros();
        let back = Timestamp::from_unix_micros(ts.as_unix_micros()).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::now();
        let b = a.plus_millis(1);
        assert!(a < b);
        assert!(a.is_before(&b));
    }
}
