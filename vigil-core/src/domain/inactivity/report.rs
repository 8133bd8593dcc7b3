use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    blackout::BlackoutPeriod,
    tier::{FollowUpStep, InactivityTier},
    volunteer::VolunteerId,
};
use crate::error::VigilError;

/// Number of volunteers fully processed per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub thirty_days: usize,
    pub sixty_days: usize,
    pub ninety_days: usize,
}

impl TierCounts {
    pub fn get(&self, tier: InactivityTier) -> usize {
        match tier {
            InactivityTier::ThirtyDays => self.thirty_days,
            InactivityTier::SixtyDays => self.sixty_days,
            InactivityTier::NinetyDays => self.ninety_days,
        }
    }

    pub fn set(&mut self, tier: InactivityTier, count: usize) {
        match tier {
            InactivityTier::ThirtyDays => self.thirty_days = count,
            InactivityTier::SixtyDays => self.sixty_days = count,
            InactivityTier::NinetyDays => self.ninety_days = count,
        }
    }

    pub fn total(&self) -> usize {
        self.thirty_days + self.sixty_days + self.ninety_days
    }
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InactivityRunReport {
    /// Reference date fell inside the blackout period; nothing was fetched.
    Skipped {
        reference: DateTime<Utc>,
        blackout: BlackoutPeriod,
    },
    /// The persistence layer reported no inactive volunteers.
    NoWork { reference: DateTime<Utc> },
    Completed {
        reference: DateTime<Utc>,
        sent: TierCounts,
    },
}

impl InactivityRunReport {
    pub fn reference(&self) -> DateTime<Utc> {
        match self {
            InactivityRunReport::Skipped { reference, .. }
            | InactivityRunReport::NoWork { reference }
            | InactivityRunReport::Completed { reference, .. } => *reference,
        }
    }

    pub fn sent(&self) -> TierCounts {
        match self {
            InactivityRunReport::Completed { sent, .. } => *sent,
            _ => TierCounts::default(),
        }
    }
}

/// Which part of a volunteer's sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
    SendEmail,
    FollowUp(FollowUpStep),
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedStep::SendEmail => f.write_str("send_email"),
            FailedStep::FollowUp(step) => fmt::Display::fmt(step, f),
        }
    }
}

/// A single volunteer whose notice or follow-up work failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolunteerFailure {
    pub tier: InactivityTier,
    pub volunteer_id: VolunteerId,
    pub step: FailedStep,
    pub message: String,
}

impl VolunteerFailure {
    pub fn new(
        tier: InactivityTier,
        volunteer_id: VolunteerId,
        step: FailedStep,
        error: &VigilError,
    ) -> Self {
        Self {
            tier,
            volunteer_id,
            step,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for VolunteerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to volunteer {}: {}",
            self.tier.job_name(),
            self.volunteer_id,
            self.message
        )
    }
}

impl std::error::Error for VolunteerFailure {}

/// Raised by the tier processor once its whole list has been attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure {
    pub tier: InactivityTier,
    /// Volunteers in this tier that were fully processed.
    pub sent: usize,
    pub failures: Vec<VolunteerFailure>,
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} volunteer(s): ",
            self.tier.job_name(),
            self.failures.len()
        )?;
        write_joined(f, &self.failures)
    }
}

impl std::error::Error for TierFailure {}

/// Run-level aggregate of every tier that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub reference: DateTime<Utc>,
    pub sent: TierCounts,
    pub tiers: Vec<TierFailure>,
}

impl RunFailure {
    /// Every per-volunteer failure, in tier then list order.
    pub fn failures(&self) -> impl Iterator<Item = &VolunteerFailure> {
        self.tiers.iter().flat_map(|tier| tier.failures.iter())
    }

    pub fn failure_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.failures.len()).sum()
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to send inactivity emails: ")?;
        let failures: Vec<&VolunteerFailure> = self.failures().collect();
        write_joined(f, &failures)
    }
}

impl std::error::Error for RunFailure {}

#[derive(Debug, Error)]
pub enum InactivityRunError {
    #[error("invalid reference date '{input}'")]
    InvalidReferenceDate { input: String },
    #[error("failed to load inactive volunteers: {0}")]
    Fetch(#[source] VigilError),
    #[error(transparent)]
    Incomplete(#[from] RunFailure),
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(item, f)?;
    }
    Ok(())
}
