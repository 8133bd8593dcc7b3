use std::sync::Arc;

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;
use vigil_config::{Config, MailConfig};
use vigil_core::{
    database::{PostgresAvailabilityRepository, PostgresVolunteerRepository},
    domain::inactivity::InactivityNotifier,
    infrastructure::mail::{LogMailer, SendGridMailer},
    mail::InactivityMailer,
};

/// Notifier wired to the production adapters.
pub type WorkerNotifier = InactivityNotifier<
    PostgresVolunteerRepository,
    PostgresAvailabilityRepository,
    dyn InactivityMailer,
>;

/// Long-lived handles shared by every job the worker runs.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub pool: PgPool,
    pub notifier: WorkerNotifier,
}

impl WorkerContext {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .context("failed to connect to PostgreSQL")?;

        let notifier = Self::build_notifier(config, pool.clone())?;
        Ok(Self { pool, notifier })
    }

    pub fn build_notifier(
        config: &Config,
        pool: PgPool,
    ) -> anyhow::Result<WorkerNotifier> {
        let mailer: Arc<dyn InactivityMailer> = match &config.mail {
            MailConfig::SendGrid(settings) => {
                let mailer = SendGridMailer::new(settings.clone())
                    .context("failed to build SendGrid client")?;
                info!(endpoint = %mailer.endpoint(), "mail backend: sendgrid");
                Arc::new(mailer)
            }
            MailConfig::Log => {
                info!("mail backend: log");
                Arc::new(LogMailer)
            }
        };

        Ok(InactivityNotifier::new(
            Arc::new(PostgresVolunteerRepository::new(pool.clone())),
            Arc::new(PostgresAvailabilityRepository::new(pool)),
            mailer,
        )
        .with_blackout_period(config.blackout))
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        vigil_core::MIGRATOR
            .run(&self.pool)
            .await
            .context("database migration failed")?;
        Ok(())
    }
}
