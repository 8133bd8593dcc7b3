use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::ports::availability::AvailabilityRepository;
use crate::domain::inactivity::VolunteerId;
use crate::error::{Result, VigilError};

#[derive(Debug, Clone)]
pub struct PostgresAvailabilityRepository {
    pool: PgPool,
}

impl PostgresAvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresAvailabilityRepository {
    async fn save_current_as_history(&self, id: VolunteerId) -> Result<()> {
        // One timestamp for the whole snapshot so the rows group together.
        let recorded_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO availability_history
                (volunteer_id, day_of_week, hour_of_day, available, recorded_at)
            SELECT volunteer_id, day_of_week, hour_of_day, available, $2
            FROM volunteer_availability
            WHERE volunteer_id = $1
            "#,
        )
        .bind(id.0)
        .bind(recorded_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            VigilError::Database(format!(
                "Failed to archive availability for volunteer {id}: {e}"
            ))
        })?;

        Ok(())
    }

    async fn clear_availability(&self, id: VolunteerId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE volunteer_availability
            SET available = FALSE,
                updated_at = NOW()
            WHERE volunteer_id = $1
            "#,
        )
        .bind(id.0)
        .execute(self.pool())
        .await
        .map_err(|e| {
            VigilError::Database(format!(
                "Failed to clear availability for volunteer {id}: {e}"
            ))
        })?;

        Ok(())
    }
}
