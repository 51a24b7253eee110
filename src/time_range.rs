use chrono::{DateTime, TimeDelta, Utc};

use crate::error::UsageError;

/// Minutes between two monitor points.
const MONITOR_INTERVAL_MINUTES: i64 = 5;
/// Extra points requested to cover values that are not yet published.
const PUBLICATION_LAG_POINTS: i64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Window ending at `now` that is wide enough to hold the last `points`
    /// monitor values.
    pub fn lookback(now: DateTime<Utc>, points: u32) -> Result<Self, UsageError> {
        let minutes = (i64::from(points) + PUBLICATION_LAG_POINTS) * MONITOR_INTERVAL_MINUTES;
        let start = TimeDelta::try_minutes(minutes)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| UsageError::InvalidTime { points })?;
        Ok(TimeRange { start, end: now })
    }
}
