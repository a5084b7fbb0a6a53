//! PostgreSQL implementation of MembershipRepository

use async_trait::async_trait;
use tracing::instrument;

use band_core::entities::Membership;
use band_core::error::DomainError;
use band_core::traits::{MembershipRepository, RepoResult};
use band_core::value_objects::{BandRole, Snowflake};

use crate::mappers::map_rows;
use crate::models::MembershipModel;

use super::error::{map_db_error, map_unique_violation};
use super::PgUnitOfWork;

#[async_trait]
impl MembershipRepository for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Membership>> {
        let result = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, band_id, user_id, role, invited_by, created_at, updated_at
            FROM memberships
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Membership::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find(
        &mut self,
        band_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        let result = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, band_id, user_id, role, invited_by, created_at, updated_at
            FROM memberships
            WHERE band_id = $1 AND user_id = $2
            ",
        )
        .bind(band_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Membership::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_band(&mut self, band_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, band_id, user_id, role, invited_by, created_at, updated_at
            FROM memberships
            WHERE band_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(band_id.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_by_user(&mut self, user_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, band_id, user_id, role, invited_by, created_at, updated_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        map_rows(results)
    }

    #[instrument(skip(self, membership), fields(membership_id = %membership.id))]
    async fn create(&mut self, membership: &Membership) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO memberships (id, band_id, user_id, role, invited_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(membership.id.into_inner())
        .bind(membership.band_id.into_inner())
        .bind(membership.user_id.into_inner())
        .bind(membership.role.as_str())
        .bind(membership.invited_by.map(Snowflake::into_inner))
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::AlreadyInvitedOrMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_role(&mut self, id: Snowflake, role: BandRole) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE memberships
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(role.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MembershipNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MembershipNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_band(&mut self, band_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM memberships WHERE band_id = $1")
            .bind(band_id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
