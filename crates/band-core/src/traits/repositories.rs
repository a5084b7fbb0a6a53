//! Repository traits (ports) - define the interface for data access
//!
//! Every repository is reached through a [`UnitOfWork`], one atomic
//! transaction. Writes become visible only after [`UnitOfWork::commit`];
//! dropping a unit of work discards them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Band, Event, Membership, Rsvp, User};
use crate::error::DomainError;
use crate::value_objects::{BandRole, EventCursor, RsvpStatus, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Keyset page over events in descending start-time order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    /// Return only rows strictly before this position
    pub before: Option<EventCursor>,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page, clamping the limit into `1..=MAX_LIMIT`
    pub fn new(limit: Option<u32>, before: Option<EventCursor>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            before,
        }
    }

    /// Same page asking for one extra row, used to detect whether more exist
    pub fn with_lookahead(self) -> Self {
        Self {
            limit: self.limit + 1,
            ..self
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send {
    /// Find user by ID
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by identity provider subject
    async fn find_by_token(&mut self, token_identifier: &str) -> RepoResult<Option<User>>;

    /// Find user by exact username
    async fn find_by_username(&mut self, username: &str) -> RepoResult<Option<User>>;

    /// Load several users at once (missing ids are skipped)
    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    /// Create a new user unless the identity already has one
    ///
    /// Returns false, writing nothing, when a user with the same
    /// `token_identifier` exists, including one committed concurrently.
    async fn create(&mut self, user: &User) -> RepoResult<bool>;

    /// Update username and display name
    async fn update(&mut self, user: &User) -> RepoResult<()>;

    /// Delete a user row
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Band Repository
// ============================================================================

#[async_trait]
pub trait BandRepository: Send {
    /// Find band by ID
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Band>>;

    /// Find band by ID and hold a row lock until the unit of work ends
    async fn lock(&mut self, id: Snowflake) -> RepoResult<Option<Band>>;

    /// Load several bands at once (missing ids are skipped)
    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<Band>>;

    /// Create a new band
    async fn create(&mut self, band: &Band) -> RepoResult<()>;

    /// Update the band name
    async fn rename(&mut self, id: Snowflake, name: &str) -> RepoResult<()>;

    /// Add `delta` to the member count, returning the new value
    async fn adjust_member_count(&mut self, id: Snowflake, delta: i32) -> RepoResult<i32>;

    /// Delete a band row
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send {
    /// Find membership by ID
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Membership>>;

    /// Find the membership of a user in a band
    async fn find(&mut self, band_id: Snowflake, user_id: Snowflake)
        -> RepoResult<Option<Membership>>;

    /// All memberships of a band, oldest first
    async fn find_by_band(&mut self, band_id: Snowflake) -> RepoResult<Vec<Membership>>;

    /// All memberships of a user, any role
    async fn find_by_user(&mut self, user_id: Snowflake) -> RepoResult<Vec<Membership>>;

    /// Create a new membership
    async fn create(&mut self, membership: &Membership) -> RepoResult<()>;

    /// Change the role of a membership
    async fn set_role(&mut self, id: Snowflake, role: BandRole) -> RepoResult<()>;

    /// Delete one membership
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()>;

    /// Delete every membership of a band
    async fn delete_by_band(&mut self, band_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Event Repository
// ============================================================================

#[async_trait]
pub trait EventRepository: Send {
    /// Find event by ID
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Event>>;

    /// Find event by ID and hold a row lock until the unit of work ends
    async fn lock(&mut self, id: Snowflake) -> RepoResult<Option<Event>>;

    /// Load several events at once (missing ids are skipped)
    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<Event>>;

    /// Every event of a band, any time
    async fn find_by_band(&mut self, band_id: Snowflake) -> RepoResult<Vec<Event>>;

    /// Events of a band starting at or after `now`, soonest first
    async fn find_upcoming_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Event>>;

    /// Events of a band that started before `now`, latest first
    async fn find_past_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
        page: Page,
    ) -> RepoResult<Vec<Event>>;

    /// Number of upcoming events of a band
    async fn count_upcoming_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<i64>;

    /// Create a new event, aggregates included
    async fn create(&mut self, event: &Event) -> RepoResult<()>;

    /// Update descriptive fields and start time (aggregates untouched)
    async fn update(&mut self, event: &Event) -> RepoResult<()>;

    /// Add deltas to the RSVP and attending counts
    async fn adjust_counts(
        &mut self,
        id: Snowflake,
        rsvp_delta: i32,
        attending_delta: i32,
    ) -> RepoResult<()>;

    /// Set the attending count to zero
    async fn reset_attending(&mut self, id: Snowflake) -> RepoResult<()>;

    /// Delete an event row
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// RSVP Repository
// ============================================================================

#[async_trait]
pub trait RsvpRepository: Send {
    /// Find the RSVP of a user for an event
    async fn find(&mut self, user_id: Snowflake, event_id: Snowflake)
        -> RepoResult<Option<Rsvp>>;

    /// Every RSVP of an event
    async fn find_by_event(&mut self, event_id: Snowflake) -> RepoResult<Vec<Rsvp>>;

    /// Every RSVP of a user
    async fn find_by_user(&mut self, user_id: Snowflake) -> RepoResult<Vec<Rsvp>>;

    /// RSVPs of a user on events starting at or after `now`, soonest first
    async fn find_upcoming_by_user(
        &mut self,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Rsvp>>;

    /// RSVPs of a user on events that started before `now`, latest first
    async fn find_past_by_user(
        &mut self,
        user_id: Snowflake,
        now: DateTime<Utc>,
        page: Page,
    ) -> RepoResult<Vec<Rsvp>>;

    /// RSVPs of a user on upcoming events of one band
    async fn find_upcoming_by_user_in_band(
        &mut self,
        user_id: Snowflake,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Rsvp>>;

    /// Create a new RSVP
    async fn create(&mut self, rsvp: &Rsvp) -> RepoResult<()>;

    /// Change the status of one RSVP
    async fn set_status(&mut self, id: Snowflake, status: RsvpStatus) -> RepoResult<()>;

    /// Reset every RSVP of an event to pending
    async fn reset_event(&mut self, event_id: Snowflake) -> RepoResult<u64>;

    /// Copy a new start time onto every RSVP of an event
    async fn set_start_time(
        &mut self,
        event_id: Snowflake,
        start_time: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Delete one RSVP
    async fn delete(&mut self, id: Snowflake) -> RepoResult<()>;

    /// Delete every RSVP of an event
    async fn delete_by_event(&mut self, event_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Unit of Work
// ============================================================================

/// One atomic transaction spanning every repository
#[async_trait]
pub trait UnitOfWork: Send {
    fn users(&mut self) -> &mut dyn UserRepository;

    fn bands(&mut self) -> &mut dyn BandRepository;

    fn memberships(&mut self) -> &mut dyn MembershipRepository;

    fn events(&mut self) -> &mut dyn EventRepository;

    fn rsvps(&mut self) -> &mut dyn RsvpRepository;

    /// Apply every write made through this unit of work
    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

/// Storage backend handing out units of work
#[async_trait]
pub trait Database: Send + Sync {
    /// Start a new unit of work
    async fn begin(&self) -> RepoResult<Box<dyn UnitOfWork>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> RepoResult<()>;
}
