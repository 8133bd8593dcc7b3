use std::fmt;

use serde::{Deserialize, Serialize};

use super::tier::InactivityTier;

/// Primary key of a volunteer record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VolunteerId(pub i64);

impl fmt::Display for VolunteerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VolunteerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Contact projection of a volunteer as returned by the inactivity query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerContact {
    pub id: VolunteerId,
    pub email: String,
    pub first_name: String,
}

impl VolunteerContact {
    pub fn new(
        id: impl Into<VolunteerId>,
        email: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: first_name.into(),
        }
    }

    /// The payload handed to the mail transport.
    pub fn to_inactivity_contact(&self) -> InactivityContact {
        InactivityContact {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
        }
    }
}

/// Recipient data for an inactivity notice; never carries the volunteer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityContact {
    pub email: String,
    pub first_name: String,
}

/// Volunteers due a notice in a single run, one list per tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveVolunteers {
    pub thirty_days: Vec<VolunteerContact>,
    pub sixty_days: Vec<VolunteerContact>,
    pub ninety_days: Vec<VolunteerContact>,
}

impl InactiveVolunteers {
    pub fn for_tier(&self, tier: InactivityTier) -> &[VolunteerContact] {
        match tier {
            InactivityTier::ThirtyDays => &self.thirty_days,
            InactivityTier::SixtyDays => &self.sixty_days,
            InactivityTier::NinetyDays => &self.ninety_days,
        }
    }

    pub fn for_tier_mut(
        &mut self,
        tier: InactivityTier,
    ) -> &mut Vec<VolunteerContact> {
        match tier {
            InactivityTier::ThirtyDays => &mut self.thirty_days,
            InactivityTier::SixtyDays => &mut self.sixty_days,
            InactivityTier::NinetyDays => &mut self.ninety_days,
        }
    }

    pub fn total(&self) -> usize {
        self.thirty_days.len() + self.sixty_days.len() + self.ninety_days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
