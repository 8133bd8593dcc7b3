use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::tier::InactivityTier;

/// One full UTC calendar day, `start` at 00:00:00.000 and `end` at
/// 23:59:59.999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl InactivityWindow {
    /// Window covering the UTC day that lies `days` calendar days before
    /// `reference`. Returns `None` when the date arithmetic leaves chrono's
    /// supported range.
    pub fn for_days_ago(reference: DateTime<Utc>, days: u64) -> Option<Self> {
        let day = reference.date_naive().checked_sub_days(Days::new(days))?;
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = start
            .checked_add_signed(TimeDelta::days(1))?
            .checked_sub_signed(TimeDelta::milliseconds(1))?;
        Some(Self { start, end })
    }

    /// Inclusive on both boundaries.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// The three day windows queried in a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityWindows {
    pub thirty_days: InactivityWindow,
    pub sixty_days: InactivityWindow,
    pub ninety_days: InactivityWindow,
}

impl InactivityWindows {
    pub fn for_reference(reference: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            thirty_days: InactivityWindow::for_days_ago(
                reference,
                InactivityTier::ThirtyDays.days(),
            )?,
            sixty_days: InactivityWindow::for_days_ago(
                reference,
                InactivityTier::SixtyDays.days(),
            )?,
            ninety_days: InactivityWindow::for_days_ago(
                reference,
                InactivityTier::NinetyDays.days(),
            )?,
        })
    }

    pub fn window(&self, tier: InactivityTier) -> &InactivityWindow {
        match tier {
            InactivityTier::ThirtyDays => &self.thirty_days,
            InactivityTier::SixtyDays => &self.sixty_days,
            InactivityTier::NinetyDays => &self.ninety_days,
        }
    }
}
