use async_trait::async_trait;
use tracing::info;

use crate::domain::inactivity::{InactivityContact, InactivityTier};
use crate::error::Result;
use crate::mail::InactivityMailer;

/// Logs notices instead of delivering them. Used for local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl InactivityMailer for LogMailer {
    async fn send_inactivity_email(
        &self,
        tier: InactivityTier,
        contact: &InactivityContact,
    ) -> Result<()> {
        info!(
            tier = %tier,
            email = %contact.email,
            first_name = %contact.first_name,
            "mail backend is 'log'; inactivity notice not delivered"
        );
        Ok(())
    }
}
