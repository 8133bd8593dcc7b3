//! Mail transport port used to deliver inactivity notices.

use async_trait::async_trait;

use crate::domain::inactivity::{InactivityContact, InactivityTier};
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InactivityMailer: Send + Sync {
    /// Deliver the notice for `tier`. An error means the volunteer did not
    /// get the email.
    async fn send_inactivity_email(
        &self,
        tier: InactivityTier,
        contact: &InactivityContact,
    ) -> Result<()>;
}
