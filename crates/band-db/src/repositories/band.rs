//! PostgreSQL implementation of BandRepository

use async_trait::async_trait;
use tracing::instrument;

use band_core::entities::Band;
use band_core::error::DomainError;
use band_core::traits::{BandRepository, RepoResult};
use band_core::value_objects::Snowflake;

use crate::models::BandModel;

use super::error::map_db_error;
use super::PgUnitOfWork;

#[async_trait]
impl BandRepository for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Band>> {
        let result = sqlx::query_as::<_, BandModel>(
            r"
            SELECT id, name, member_count, created_at, updated_at
            FROM bands
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Band::from))
    }

    #[instrument(skip(self))]
    async fn lock(&mut self, id: Snowflake) -> RepoResult<Option<Band>> {
        let result = sqlx::query_as::<_, BandModel>(
            r"
            SELECT id, name, member_count, created_at, updated_at
            FROM bands
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Band::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<Band>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, BandModel>(
            r"
            SELECT id, name, member_count, created_at, updated_at
            FROM bands
            WHERE id = ANY($1)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Band::from).collect())
    }

    #[instrument(skip(self, band), fields(band_id = %band.id))]
    async fn create(&mut self, band: &Band) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO bands (id, name, member_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(band.id.into_inner())
        .bind(&band.name)
        .bind(band.member_count)
        .bind(band.created_at)
        .bind(band.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn rename(&mut self, id: Snowflake, name: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE bands
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(name)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BandNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn adjust_member_count(&mut self, id: Snowflake, delta: i32) -> RepoResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r"
            UPDATE bands
            SET member_count = member_count + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING member_count
            ",
        )
        .bind(id.into_inner())
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::BandNotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM bands WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BandNotFound(id));
        }

        Ok(())
    }
}
