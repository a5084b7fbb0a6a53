//! PostgreSQL implementation of RsvpRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use band_core::entities::Rsvp;
use band_core::error::DomainError;
use band_core::traits::{Page, RepoResult, RsvpRepository};
use band_core::value_objects::{RsvpStatus, Snowflake};

use crate::mappers::map_rows;
use crate::models::RsvpModel;

use super::error::{map_db_error, map_unique_violation, no_rows};
use super::PgUnitOfWork;

#[async_trait]
impl RsvpRepository for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn find(&mut self, user_id: Snowflake, event_id: Snowflake) -> RepoResult<Option<Rsvp>> {
        let result = sqlx::query_as::<_, RsvpModel>(
            r"
            SELECT id, user_id, event_id, status, start_time, created_at, updated_at
            FROM rsvps
            WHERE user_id = $1 AND event_id = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(event_id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Rsvp::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_event(&mut self, event_id: Snowflake) -> RepoResult<Vec<Rsvp>> {
        let results = sqlx::query_as::<_, RsvpModel>(
            r"
            SELECT id, user_id, event_id, status, start_time, created_at, updated_at
            FROM rsvps
            WHERE event_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(event_id.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_by_user(&mut self, user_id: Snowflake) -> RepoResult<Vec<Rsvp>> {
        let results = sqlx::query_as::<_, RsvpModel>(
            r"
            SELECT id, user_id, event_id, status, start_time, created_at, updated_at
            FROM rsvps
            WHERE user_id = $1
            ORDER BY start_time, event_id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_upcoming_by_user(
        &mut self,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Rsvp>> {
        let results = sqlx::query_as::<_, RsvpModel>(
            r"
            SELECT id, user_id, event_id, status, start_time, created_at, updated_at
            FROM rsvps
            WHERE user_id = $1 AND start_time >= $2
            ORDER BY start_time, event_id
            ",
        )
        .bind(user_id.into_inner())
        .bind(now)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_past_by_user(
        &mut self,
        user_id: Snowflake,
        now: DateTime<Utc>,
        page: Page,
    ) -> RepoResult<Vec<Rsvp>> {
        let results = sqlx::query_as::<_, RsvpModel>(
            r"
            SELECT id, user_id, event_id, status, start_time, created_at, updated_at
            FROM rsvps
            WHERE user_id = $1
              AND start_time < $2
              AND ($3::timestamptz IS NULL OR (start_time, event_id) < ($3, $4))
            ORDER BY start_time DESC, event_id DESC
            LIMIT $5
            ",
        )
        .bind(user_id.into_inner())
        .bind(now)
        .bind(page.before.map(|c| c.start_time))
        .bind(page.before.map(|c| c.event_id.into_inner()))
        .bind(i64::from(page.limit))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_upcoming_by_user_in_band(
        &mut self,
        user_id: Snowflake,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Rsvp>> {
        let results = sqlx::query_as::<_, RsvpModel>(
            r"
            SELECT r.id, r.user_id, r.event_id, r.status, r.start_time, r.created_at, r.updated_at
            FROM rsvps r
            JOIN events e ON e.id = r.event_id
            WHERE r.user_id = $1 AND e.band_id = $2 AND e.start_time >= $3
            ORDER BY e.start_time, e.id
            ",
        )
        .bind(user_id.into_inner())
        .bind(band_id.into_inner())
        .bind(now)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self, rsvp), fields(rsvp_id = %rsvp.id))]
    async fn create(&mut self, rsvp: &Rsvp) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO rsvps (id, user_id, event_id, status, start_time, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(rsvp.id.into_inner())
        .bind(rsvp.user_id.into_inner())
        .bind(rsvp.event_id.into_inner())
        .bind(rsvp.status.as_str())
        .bind(rsvp.start_time)
        .bind(rsvp.created_at)
        .bind(rsvp.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, |_| {
                DomainError::DatabaseError(format!(
                    "rsvp already exists for user {} on event {}",
                    rsvp.user_id, rsvp.event_id
                ))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_status(&mut self, id: Snowflake, status: RsvpStatus) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE rsvps SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(no_rows("rsvps"));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_event(&mut self, event_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE rsvps SET status = $2, updated_at = NOW() WHERE event_id = $1",
        )
        .bind(event_id.into_inner())
        .bind(RsvpStatus::Pending.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn set_start_time(
        &mut self,
        event_id: Snowflake,
        start_time: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query("UPDATE rsvps SET start_time = $2, updated_at = NOW() WHERE event_id = $1")
            .bind(event_id.into_inner())
            .bind(start_time)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(no_rows("rsvps"));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_event(&mut self, event_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM rsvps WHERE event_id = $1")
            .bind(event_id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
