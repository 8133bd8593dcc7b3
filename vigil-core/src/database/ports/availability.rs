use async_trait::async_trait;

use crate::domain::inactivity::VolunteerId;
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Snapshot the volunteer's current weekly availability into history.
    async fn save_current_as_history(&self, id: VolunteerId) -> Result<()>;

    /// Mark every slot of the volunteer's weekly availability as unavailable.
    async fn clear_availability(&self, id: VolunteerId) -> Result<()>;
}
