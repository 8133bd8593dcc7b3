use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 2020-12-21T00:00:00.000Z
const DEFAULT_BLACKOUT_START_MS: i64 = 1_608_508_800_000;
/// 2021-01-03T23:59:59.999Z
const DEFAULT_BLACKOUT_END_MS: i64 = 1_609_718_399_999;

/// Fixed date range during which no inactivity notices go out.
///
/// Both boundaries are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BlackoutPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

impl Default for BlackoutPeriod {
    fn default() -> Self {
        Self {
            start: DateTime::from_timestamp_millis(DEFAULT_BLACKOUT_START_MS)
                .unwrap_or_default(),
            end: DateTime::from_timestamp_millis(DEFAULT_BLACKOUT_END_MS)
                .unwrap_or_default(),
        }
    }
}
