use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::database::ports::volunteers::VolunteerRepository;
use crate::domain::inactivity::{
    InactiveVolunteers, InactivityTier, InactivityWindows, VolunteerContact,
    VolunteerId,
};
use crate::error::{Result, VigilError};

#[derive(Debug, Clone)]
pub struct PostgresVolunteerRepository {
    pool: PgPool,
}

impl PostgresVolunteerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<(InactivityTier, VolunteerContact)> {
        let id: i64 = row.try_get("id").map_err(|e| {
            VigilError::Database(format!("Failed to read volunteer id: {e}"))
        })?;
        let email: String = row.try_get("email").map_err(|e| {
            VigilError::Database(format!("Failed to read volunteer email: {e}"))
        })?;
        let first_name: String = row.try_get("first_name").map_err(|e| {
            VigilError::Database(format!(
                "Failed to read volunteer first_name: {e}"
            ))
        })?;
        let tier: String = row.try_get("tier").map_err(|e| {
            VigilError::Database(format!("Failed to read inactivity tier: {e}"))
        })?;

        let tier = match tier.as_str() {
            "thirty_days" => InactivityTier::ThirtyDays,
            "sixty_days" => InactivityTier::SixtyDays,
            "ninety_days" => InactivityTier::NinetyDays,
            other => {
                return Err(VigilError::Internal(format!(
                    "Unexpected inactivity tier '{other}' for volunteer {id}"
                )));
            }
        };

        Ok((tier, VolunteerContact::new(id, email, first_name)))
    }

    fn mark_sent_query(tier: InactivityTier) -> &'static str {
        match tier {
            InactivityTier::ThirtyDays => {
                r#"
                UPDATE volunteers
                SET sent_inactive_thirty_day_email_at = NOW(),
                    updated_at = NOW()
                WHERE id = $1
                "#
            }
            InactivityTier::SixtyDays => {
                r#"
                UPDATE volunteers
                SET sent_inactive_sixty_day_email_at = NOW(),
                    updated_at = NOW()
                WHERE id = $1
                "#
            }
            InactivityTier::NinetyDays => {
                r#"
                UPDATE volunteers
                SET sent_inactive_ninety_day_email_at = NOW(),
                    updated_at = NOW()
                WHERE id = $1
                "#
            }
        }
    }
}

#[async_trait]
impl VolunteerRepository for PostgresVolunteerRepository {
    async fn fetch_inactive_volunteers(
        &self,
        windows: &InactivityWindows,
    ) -> Result<Option<InactiveVolunteers>> {
        // The three windows are distinct calendar days, so the CASE picks
        // exactly one tier for each matching row.
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                email,
                first_name,
                CASE
                    WHEN last_activity_at BETWEEN $1 AND $2 THEN 'thirty_days'
                    WHEN last_activity_at BETWEEN $3 AND $4 THEN 'sixty_days'
                    ELSE 'ninety_days'
                END AS tier
            FROM volunteers
            WHERE deactivated = FALSE
              AND test_user = FALSE
              AND (
                    (last_activity_at BETWEEN $1 AND $2
                        AND sent_inactive_thirty_day_email_at IS NULL)
                 OR (last_activity_at BETWEEN $3 AND $4
                        AND sent_inactive_sixty_day_email_at IS NULL)
                 OR (last_activity_at BETWEEN $5 AND $6
                        AND sent_inactive_ninety_day_email_at IS NULL)
              )
            ORDER BY id
            "#,
        )
        .bind(windows.thirty_days.start)
        .bind(windows.thirty_days.end)
        .bind(windows.sixty_days.start)
        .bind(windows.sixty_days.end)
        .bind(windows.ninety_days.start)
        .bind(windows.ninety_days.end)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            VigilError::Database(format!(
                "Failed to load inactive volunteers: {e}"
            ))
        })?;

        let mut volunteers = InactiveVolunteers::default();
        for row in &rows {
            let (tier, contact) = Self::map_row(row)?;
            volunteers.for_tier_mut(tier).push(contact);
        }

        if volunteers.is_empty() {
            return Ok(None);
        }
        Ok(Some(volunteers))
    }

    async fn mark_inactivity_email_sent(
        &self,
        id: VolunteerId,
        tier: InactivityTier,
    ) -> Result<()> {
        let result = sqlx::query(Self::mark_sent_query(tier))
            .bind(id.0)
            .execute(self.pool())
            .await
            .map_err(|e| {
                VigilError::Database(format!(
                    "Failed to record {tier} notice for volunteer {id}: {e}"
                ))
            })?;

        if result.rows_affected() == 0 {
            return Err(VigilError::NotFound(format!("volunteer {id}")));
        }
        Ok(())
    }
}
