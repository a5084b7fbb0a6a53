//! PostgreSQL implementation of EventRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use band_core::entities::Event;
use band_core::error::DomainError;
use band_core::traits::{EventRepository, Page, RepoResult};
use band_core::value_objects::Snowflake;

use crate::mappers::map_rows;
use crate::models::EventModel;

use super::error::map_db_error;
use super::PgUnitOfWork;

#[async_trait]
impl EventRepository for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Event>> {
        let result = sqlx::query_as::<_, EventModel>(
            r"
            SELECT id, band_id, name, event_type, start_time, location, description,
                   rsvp_count, attending_count, created_at, updated_at
            FROM events
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Event::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn lock(&mut self, id: Snowflake) -> RepoResult<Option<Event>> {
        let result = sqlx::query_as::<_, EventModel>(
            r"
            SELECT id, band_id, name, event_type, start_time, location, description,
                   rsvp_count, attending_count, created_at, updated_at
            FROM events
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Event::try_from).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<Event>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, EventModel>(
            r"
            SELECT id, band_id, name, event_type, start_time, location, description,
                   rsvp_count, attending_count, created_at, updated_at
            FROM events
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_by_band(&mut self, band_id: Snowflake) -> RepoResult<Vec<Event>> {
        let results = sqlx::query_as::<_, EventModel>(
            r"
            SELECT id, band_id, name, event_type, start_time, location, description,
                   rsvp_count, attending_count, created_at, updated_at
            FROM events
            WHERE band_id = $1
            ORDER BY start_time, id
            ",
        )
        .bind(band_id.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_upcoming_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Event>> {
        let results = sqlx::query_as::<_, EventModel>(
            r"
            SELECT id, band_id, name, event_type, start_time, location, description,
                   rsvp_count, attending_count, created_at, updated_at
            FROM events
            WHERE band_id = $1 AND start_time >= $2
            ORDER BY start_time, id
            ",
        )
        .bind(band_id.into_inner())
        .bind(now)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_past_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
        page: Page,
    ) -> RepoResult<Vec<Event>> {
        let results = sqlx::query_as::<_, EventModel>(
            r"
            SELECT id, band_id, name, event_type, start_time, location, description,
                   rsvp_count, attending_count, created_at, updated_at
            FROM events
            WHERE band_id = $1
              AND start_time < $2
              AND ($3::timestamptz IS NULL OR (start_time, id) < ($3, $4))
            ORDER BY start_time DESC, id DESC
            LIMIT $5
            ",
        )
        .bind(band_id.into_inner())
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
    async fn count_upcoming_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE band_id = $1 AND start_time >= $2",
        )
        .bind(band_id.into_inner())
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create(&mut self, event: &Event) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO events (id, band_id, name, event_type, start_time, location, description,
                                rsvp_count, attending_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(event.id.into_inner())
        .bind(event.band_id.into_inner())
        .bind(&event.name)
        .bind(event.event_type.as_str())
        .bind(event.start_time)
        .bind(&event.location)
        .bind(&event.description)
        .bind(event.rsvp_count)
        .bind(event.attending_count)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update(&mut self, event: &Event) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE events
            SET name = $2, event_type = $3, start_time = $4, location = $5, description = $6,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(event.id.into_inner())
        .bind(&event.name)
        .bind(event.event_type.as_str())
        .bind(event.start_time)
        .bind(&event.location)
        .bind(&event.description)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EventNotFound(event.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn adjust_counts(
        &mut self,
        id: Snowflake,
        rsvp_delta: i32,
        attending_delta: i32,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE events
            SET rsvp_count = rsvp_count + $2,
                attending_count = attending_count + $3,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(rsvp_delta)
        .bind(attending_delta)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EventNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_attending(&mut self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE events SET attending_count = 0, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.into_inner())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EventNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EventNotFound(id));
        }

        Ok(())
    }
}
