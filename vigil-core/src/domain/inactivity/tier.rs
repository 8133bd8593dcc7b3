use std::fmt;

use serde::{Deserialize, Serialize};

/// Inactivity threshold that decides which notice a volunteer receives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InactivityTier {
    ThirtyDays,
    SixtyDays,
    NinetyDays,
}

/// Work performed for a volunteer after their notice was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStep {
    MarkSent,
    ArchiveAvailability,
    ClearAvailability,
}

impl InactivityTier {
    /// Every tier, in processing order.
    pub const ALL: [InactivityTier; 3] = [
        InactivityTier::ThirtyDays,
        InactivityTier::SixtyDays,
        InactivityTier::NinetyDays,
    ];

    pub const fn days(self) -> u64 {
        match self {
            InactivityTier::ThirtyDays => 30,
            InactivityTier::SixtyDays => 60,
            InactivityTier::NinetyDays => 90,
        }
    }

    /// Job name used in log lines and failure messages.
    pub const fn job_name(self) -> &'static str {
        match self {
            InactivityTier::ThirtyDays => "EmailVolunteerInactiveThirtyDays",
            InactivityTier::SixtyDays => "EmailVolunteerInactiveSixtyDays",
            InactivityTier::NinetyDays => "EmailVolunteerInactiveNinetyDays",
        }
    }

    /// Steps run, in order, once the notice for this tier has been sent.
    ///
    /// Only the ninety day tier touches availability: the current schedule
    /// is archived before it is cleared.
    pub const fn follow_up_steps(self) -> &'static [FollowUpStep] {
        match self {
            InactivityTier::ThirtyDays | InactivityTier::SixtyDays => {
                &[FollowUpStep::MarkSent]
            }
            InactivityTier::NinetyDays => &[
                FollowUpStep::MarkSent,
                FollowUpStep::ArchiveAvailability,
                FollowUpStep::ClearAvailability,
            ],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            InactivityTier::ThirtyDays => "thirty_days",
            InactivityTier::SixtyDays => "sixty_days",
            InactivityTier::NinetyDays => "ninety_days",
        }
    }
}

impl fmt::Display for InactivityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FollowUpStep {
    pub const fn as_str(self) -> &'static str {
        match self {
            FollowUpStep::MarkSent => "mark_sent",
            FollowUpStep::ArchiveAvailability => "archive_availability",
            FollowUpStep::ClearAvailability => "clear_availability",
        }
    }
}

impl fmt::Display for FollowUpStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
