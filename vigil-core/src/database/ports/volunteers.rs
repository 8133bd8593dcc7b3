use async_trait::async_trait;

use crate::domain::inactivity::{
    InactiveVolunteers, InactivityTier, InactivityWindows, VolunteerId,
};
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// Volunteers whose last activity falls inside one of the tier windows
    /// and who have not yet received that tier's notice.
    ///
    /// `None` means there is nothing to do for this run.
    async fn fetch_inactive_volunteers(
        &self,
        windows: &InactivityWindows,
    ) -> Result<Option<InactiveVolunteers>>;

    /// Record that the notice for `tier` went out to `id`.
    async fn mark_inactivity_email_sent(
        &self,
        id: VolunteerId,
        tier: InactivityTier,
    ) -> Result<()>;
}
