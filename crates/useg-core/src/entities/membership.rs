//! Membership period - the [start, end) interval a user belongs to a segment

use chrono::{DateTime, Datelike, Utc};

/// Unix timestamp of 9999-01-01T00:00:00Z
const INFINITE_END_SECS: i64 = 253_370_764_800;

/// Sentinel end timestamp meaning "no defined end"
pub fn infinite_end() -> DateTime<Utc> {
    DateTime::from_timestamp(INFINITE_END_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Interval during which a membership is in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipPeriod {
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl MembershipPeriod {
    /// Period starting at `started_at`
    ///
    /// A missing end, or the zero instant (`0001-01-01T00:00:00Z`), means the
    /// membership never expires.
    pub fn new(started_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Self {
        let ends_at = ends_at
            .filter(|end| end.year() > 1)
            .unwrap_or_else(infinite_end);
        Self { started_at, ends_at }
    }

    /// Period starting now
    pub fn starting_now(ends_at: Option<DateTime<Utc>>) -> Self {
        Self::new(Utc::now(), ends_at)
    }

    /// Open-ended period starting now
    pub fn unbounded() -> Self {
        Self::starting_now(None)
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.ends_at == infinite_end()
    }

    /// Whether the membership is still in effect at `at`
    #[inline]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        at < self.ends_at
    }
}
