//! # band-db
//!
//! Storage layer implementing the unit-of-work and repository traits of
//! `band-core`.
//!
//! ## Overview
//!
//! - PostgreSQL via SQLx: connection pool, bundled migrations, models,
//!   model to entity mappers, and repositories sharing one transaction
//! - An in-memory backend with the same constraints, for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use band_db::connect;
//!
//! async fn example(config: &band_common::DatabaseConfig) -> Result<(), band_core::DomainError> {
//!     let database = connect(config).await?;
//!     let mut uow = database.begin().await?;
//!     let user = uow.users().find_by_username("ada").await?;
//!     uow.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

use std::sync::Arc;

use tracing::info;

use band_common::DatabaseConfig;
use band_core::traits::Database;
use band_core::DomainError;

// Re-export commonly used types
pub use memory::MemoryDatabase;
pub use pool::{create_pool, run_migrations, PgPool, PoolOptions, MIGRATIONS_DIR};
pub use repositories::{PgDatabase, PgUnitOfWork};

/// Open the backend selected by `config.url`
///
/// `memory://` selects the in-memory store; anything else is treated as a
/// PostgreSQL URL, migrated first when `run_migrations` is set.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Database>, DomainError> {
    if config.is_memory() {
        info!("Using in-memory database");
        return Ok(Arc::new(MemoryDatabase::new()));
    }

    let pool = create_pool(config, &PoolOptions::default())
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
    info!(max_connections = config.max_connections, "Database pool created");

    if config.run_migrations {
        run_migrations(&pool, MIGRATIONS_DIR)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
    }

    Ok(Arc::new(PgDatabase::new(pool)))
}
