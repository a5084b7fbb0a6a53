//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use tracing::instrument;

use band_core::entities::User;
use band_core::error::DomainError;
use band_core::traits::{RepoResult, UserRepository};
use band_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation, no_rows};
use super::PgUnitOfWork;

fn user_conflict(user: &User) -> impl FnOnce(Option<&str>) -> DomainError + '_ {
    move |constraint| match constraint {
        Some("users_username_key") => DomainError::UsernameTaken(user.username.clone()),
        _ => DomainError::DatabaseError(format!("user id {} already exists", user.id)),
    }
}

#[async_trait]
impl UserRepository for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, token_identifier, username, display_name, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_token(&mut self, token_identifier: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, token_identifier, username, display_name, created_at, updated_at
            FROM users
            WHERE token_identifier = $1
            ",
        )
        .bind(token_identifier)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&mut self, username: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, token_identifier, username, display_name, created_at, updated_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, token_identifier, username, display_name, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&mut self, user: &User) -> RepoResult<bool> {
        // Waits on a concurrent insert of the same identity, then skips
        let result = sqlx::query(
            r"
            INSERT INTO users (id, token_identifier, username, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (token_identifier) DO NOTHING
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.token_identifier)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, user_conflict(user)))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&mut self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET username = $2, display_name = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.username)
        .bind(&user.display_name)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, user_conflict(user)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user.id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(no_rows("users"));
        }

        Ok(())
    }
}
