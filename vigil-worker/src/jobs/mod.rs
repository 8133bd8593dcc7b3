//! Job entry points dispatched by the CLI.

mod backfill;
mod inactivity;
mod payload;

use std::fmt;

use vigil_core::domain::inactivity::{INACTIVITY_JOB_NAME, InactivityTier};

pub use backfill::{BackfillError, BackfillSummary, FailedDay, backfill_inactivity};
pub use inactivity::run_inactivity_job;
pub use payload::InactivityJobPayload;

/// Names the worker logs its jobs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobName {
    EmailVolunteerInactive,
    EmailVolunteerInactiveThirtyDays,
    EmailVolunteerInactiveSixtyDays,
    EmailVolunteerInactiveNinetyDays,
}

impl JobName {
    pub fn for_tier(tier: InactivityTier) -> Self {
        match tier {
            InactivityTier::ThirtyDays => JobName::EmailVolunteerInactiveThirtyDays,
            InactivityTier::SixtyDays => JobName::EmailVolunteerInactiveSixtyDays,
            InactivityTier::NinetyDays => JobName::EmailVolunteerInactiveNinetyDays,
        }
    }

    pub fn tier(self) -> Option<InactivityTier> {
        match self {
            JobName::EmailVolunteerInactive => None,
            JobName::EmailVolunteerInactiveThirtyDays => {
                Some(InactivityTier::ThirtyDays)
            }
            JobName::EmailVolunteerInactiveSixtyDays => {
                Some(InactivityTier::SixtyDays)
            }
            JobName::EmailVolunteerInactiveNinetyDays => {
                Some(InactivityTier::NinetyDays)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.tier() {
            Some(tier) => tier.job_name(),
            None => INACTIVITY_JOB_NAME,
        }
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
