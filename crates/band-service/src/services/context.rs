//! Service context - dependency container for services
//!
//! Holds the storage handle, the identity verifier and the id generator.

use std::sync::Arc;

use band_common::IdentityVerifier;
use band_core::traits::{Database, UnitOfWork};
use band_core::{Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct ServiceContext {
    database: Arc<dyn Database>,
    identity_verifier: Arc<IdentityVerifier>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        database: Arc<dyn Database>,
        identity_verifier: Arc<IdentityVerifier>,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            database,
            identity_verifier,
            snowflake_generator,
        }
    }

    // === Storage ===

    /// Get the storage backend
    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    /// Open a new unit of work
    pub async fn begin(&self) -> ServiceResult<Box<dyn UnitOfWork>> {
        Ok(self.database.begin().await?)
    }

    // === Services ===

    /// Get the identity token verifier
    pub fn identity_verifier(&self) -> &IdentityVerifier {
        self.identity_verifier.as_ref()
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("database", &"dyn Database")
            .field("identity_verifier", &"IdentityVerifier")
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    database: Option<Arc<dyn Database>>,
    identity_verifier: Option<Arc<IdentityVerifier>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(mut self, database: Arc<dyn Database>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn identity_verifier(mut self, verifier: Arc<IdentityVerifier>) -> Self {
        self.identity_verifier = Some(verifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.database
                .ok_or_else(|| ServiceError::validation("database is required"))?,
            self.identity_verifier
                .ok_or_else(|| ServiceError::validation("identity_verifier is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
        ))
    }
}
