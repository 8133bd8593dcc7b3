//! Volunteer inactivity notices.
//!
//! A scheduled run looks back 30, 60 and 90 days from its reference date,
//! emails every volunteer whose last activity fell on one of those days and
//! who has not yet received that tier's notice, and records the delivery.
//! At 90 days the volunteer's availability is archived and then cleared.

pub mod blackout;
pub mod notifier;
pub mod reference;
pub mod report;
pub mod tier;
pub mod volunteer;
pub mod window;

pub use blackout::BlackoutPeriod;
pub use notifier::{INACTIVITY_JOB_NAME, InactivityNotifier};
pub use reference::parse_reference_date;
pub use report::{
    FailedStep, InactivityRunError, InactivityRunReport, RunFailure,
    TierCounts, TierFailure, VolunteerFailure,
};
pub use tier::{FollowUpStep, InactivityTier};
pub use volunteer::{
    InactiveVolunteers, InactivityContact, VolunteerContact, VolunteerId,
};
pub use window::{InactivityWindow, InactivityWindows};
