//! PostgreSQL unit of work
//!
//! One `sqlx` transaction per unit of work at READ COMMITTED. Read-then-decide
//! mutations take row locks through `BandRepository::lock` and
//! `EventRepository::lock`; counters move through atomic delta updates.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use band_core::traits::{
    BandRepository, Database, EventRepository, MembershipRepository, RepoResult, RsvpRepository,
    UnitOfWork, UserRepository,
};

use super::error::map_db_error;

/// PostgreSQL backed [`Database`]
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Create a new PgDatabase
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

/// Transaction shared by every PostgreSQL repository
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PgUnitOfWork {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn bands(&mut self) -> &mut dyn BandRepository {
        self
    }

    fn memberships(&mut self) -> &mut dyn MembershipRepository {
        self
    }

    fn events(&mut self) -> &mut dyn EventRepository {
        self
    }

    fn rsvps(&mut self) -> &mut dyn RsvpRepository {
        self
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }
}
