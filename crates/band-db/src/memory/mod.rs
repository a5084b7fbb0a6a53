//! In-memory storage backend
//!
//! Units of work are serialized through one async mutex. Each unit of work
//! edits a private copy of the state and writes it back on commit, so a
//! dropped unit of work leaves no trace. The same unique constraints and
//! counter checks as the PostgreSQL schema are enforced.
//!
//! All data is lost when the process exits.

mod repositories;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use band_core::entities::{Band, Event, Membership, Rsvp, User};
use band_core::traits::{
    BandRepository, Database, EventRepository, MembershipRepository, RepoResult, RsvpRepository,
    UnitOfWork, UserRepository,
};
use band_core::value_objects::Snowflake;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<Snowflake, User>,
    bands: BTreeMap<Snowflake, Band>,
    memberships: BTreeMap<Snowflake, Membership>,
    events: BTreeMap<Snowflake, Event>,
    rsvps: BTreeMap<Snowflake, Rsvp>,
}

/// In-memory [`Database`]
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Exclusive view of the in-memory state
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
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
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
