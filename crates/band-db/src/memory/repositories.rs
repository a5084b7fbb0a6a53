//! Repository traits over the in-memory state
//!
//! Orderings mirror the SQL of the PostgreSQL repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use band_core::entities::{Band, Event, Membership, Rsvp, User};
use band_core::error::DomainError;
use band_core::traits::{
    BandRepository, EventRepository, MembershipRepository, Page, RepoResult, RsvpRepository,
    UserRepository,
};
use band_core::value_objects::{BandRole, RsvpStatus, Snowflake};

use super::MemoryUnitOfWork;

fn no_rows(table: &str) -> DomainError {
    DomainError::DatabaseError(format!("no matching row in {table}"))
}

fn check_violation(constraint: &str) -> DomainError {
    DomainError::DatabaseError(format!("check constraint violated: {constraint}"))
}

/// Keep rows strictly before the page cursor, latest first, up to the page limit
fn page_desc<T>(mut rows: Vec<T>, page: Page, key: impl Fn(&T) -> (DateTime<Utc>, Snowflake)) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows.into_iter()
        .filter(|row| {
            page.before
                .map_or(true, |c| key(row) < (c.start_time, c.event_id))
        })
        .take(page.limit as usize)
        .collect()
}

// ============================================================================
// Users
// ============================================================================

#[async_trait]
impl UserRepository for MemoryUnitOfWork {
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_by_token(&mut self, token_identifier: &str) -> RepoResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.token_identifier == token_identifier)
            .cloned())
    }

    async fn find_by_username(&mut self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.users.get(id).cloned())
            .collect())
    }

    async fn create(&mut self, user: &User) -> RepoResult<bool> {
        let users = &self.working.users;
        if users.values().any(|u| u.token_identifier == user.token_identifier) {
            return Ok(false);
        }
        if users.contains_key(&user.id) {
            return Err(DomainError::DatabaseError(format!(
                "user id {} already exists",
                user.id
            )));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(DomainError::UsernameTaken(user.username.clone()));
        }

        self.working.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn update(&mut self, user: &User) -> RepoResult<()> {
        if self
            .working
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(DomainError::UsernameTaken(user.username.clone()));
        }

        let stored = self
            .working
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::UserNotFound(user.id.to_string()))?;
        stored.username.clone_from(&user.username);
        stored.display_name.clone_from(&user.display_name);
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        self.working
            .users
            .remove(&id)
            .ok_or_else(|| no_rows("users"))?;

        // ON DELETE SET NULL
        for membership in self.working.memberships.values_mut() {
            if membership.invited_by == Some(id) {
                membership.invited_by = None;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Bands
// ============================================================================

#[async_trait]
impl BandRepository for MemoryUnitOfWork {
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Band>> {
        Ok(self.working.bands.get(&id).cloned())
    }

    // The unit of work already holds the whole store exclusively
    async fn lock(&mut self, id: Snowflake) -> RepoResult<Option<Band>> {
        Ok(self.working.bands.get(&id).cloned())
    }

    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<Band>> {
        let mut bands: Vec<Band> = ids
            .iter()
            .filter_map(|id| self.working.bands.get(id).cloned())
            .collect();
        bands.sort_by_key(|b| std::cmp::Reverse((b.created_at, b.id)));
        Ok(bands)
    }

    async fn create(&mut self, band: &Band) -> RepoResult<()> {
        if band.member_count < 0 {
            return Err(check_violation("bands_member_count_check"));
        }
        self.working.bands.insert(band.id, band.clone());
        Ok(())
    }

    async fn rename(&mut self, id: Snowflake, name: &str) -> RepoResult<()> {
        let band = self
            .working
            .bands
            .get_mut(&id)
            .ok_or(DomainError::BandNotFound(id))?;
        band.set_name(name.to_string());
        Ok(())
    }

    async fn adjust_member_count(&mut self, id: Snowflake, delta: i32) -> RepoResult<i32> {
        let band = self
            .working
            .bands
            .get_mut(&id)
            .ok_or(DomainError::BandNotFound(id))?;

        let next = band.member_count + delta;
        if next < 0 {
            return Err(check_violation("bands_member_count_check"));
        }
        band.member_count = next;
        band.updated_at = Utc::now();
        Ok(next)
    }

    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        self.working
            .bands
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::BandNotFound(id))
    }
}

// ============================================================================
// Memberships
// ============================================================================

#[async_trait]
impl MembershipRepository for MemoryUnitOfWork {
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Membership>> {
        Ok(self.working.memberships.get(&id).cloned())
    }

    async fn find(
        &mut self,
        band_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        Ok(self
            .working
            .memberships
            .values()
            .find(|m| m.band_id == band_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_by_band(&mut self, band_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let mut memberships: Vec<Membership> = self
            .working
            .memberships
            .values()
            .filter(|m| m.band_id == band_id)
            .cloned()
            .collect();
        memberships.sort_by_key(Membership::seniority);
        Ok(memberships)
    }

    async fn find_by_user(&mut self, user_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let mut memberships: Vec<Membership> = self
            .working
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| std::cmp::Reverse(m.seniority()));
        Ok(memberships)
    }

    async fn create(&mut self, membership: &Membership) -> RepoResult<()> {
        let duplicate = self
            .working
            .memberships
            .values()
            .any(|m| m.band_id == membership.band_id && m.user_id == membership.user_id);
        if duplicate {
            return Err(DomainError::AlreadyInvitedOrMember);
        }

        self.working
            .memberships
            .insert(membership.id, membership.clone());
        Ok(())
    }

    async fn set_role(&mut self, id: Snowflake, role: BandRole) -> RepoResult<()> {
        let membership = self
            .working
            .memberships
            .get_mut(&id)
            .ok_or(DomainError::MembershipNotFound)?;
        membership.role = role;
        membership.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        self.working
            .memberships
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::MembershipNotFound)
    }

    async fn delete_by_band(&mut self, band_id: Snowflake) -> RepoResult<u64> {
        let before = self.working.memberships.len();
        self.working.memberships.retain(|_, m| m.band_id != band_id);
        Ok((before - self.working.memberships.len()) as u64)
    }
}

// ============================================================================
// Events
// ============================================================================

impl MemoryUnitOfWork {
    fn band_events(&self, band_id: Snowflake) -> impl Iterator<Item = &Event> {
        self.working
            .events
            .values()
            .filter(move |e| e.band_id == band_id)
    }
}

#[async_trait]
impl EventRepository for MemoryUnitOfWork {
    async fn find_by_id(&mut self, id: Snowflake) -> RepoResult<Option<Event>> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn lock(&mut self, id: Snowflake) -> RepoResult<Option<Event>> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn find_many(&mut self, ids: &[Snowflake]) -> RepoResult<Vec<Event>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.events.get(id).cloned())
            .collect())
    }

    async fn find_by_band(&mut self, band_id: Snowflake) -> RepoResult<Vec<Event>> {
        let mut events: Vec<Event> = self.band_events(band_id).cloned().collect();
        events.sort_by_key(|e| (e.start_time, e.id));
        Ok(events)
    }

    async fn find_upcoming_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .band_events(band_id)
            .filter(|e| e.is_upcoming(now))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start_time, e.id));
        Ok(events)
    }

    async fn find_past_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
        page: Page,
    ) -> RepoResult<Vec<Event>> {
        let events: Vec<Event> = self
            .band_events(band_id)
            .filter(|e| !e.is_upcoming(now))
            .cloned()
            .collect();
        Ok(page_desc(events, page, |e| (e.start_time, e.id)))
    }

    async fn count_upcoming_by_band(
        &mut self,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<i64> {
        Ok(self
            .band_events(band_id)
            .filter(|e| e.is_upcoming(now))
            .count() as i64)
    }

    async fn create(&mut self, event: &Event) -> RepoResult<()> {
        if event.attending_count < 0 || event.attending_count > event.rsvp_count {
            return Err(check_violation("events_counts_check"));
        }
        self.working.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&mut self, event: &Event) -> RepoResult<()> {
        let stored = self
            .working
            .events
            .get_mut(&event.id)
            .ok_or(DomainError::EventNotFound(event.id))?;

        stored.name.clone_from(&event.name);
        stored.event_type = event.event_type;
        stored.start_time = event.start_time;
        stored.location.clone_from(&event.location);
        stored.description.clone_from(&event.description);
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_counts(
        &mut self,
        id: Snowflake,
        rsvp_delta: i32,
        attending_delta: i32,
    ) -> RepoResult<()> {
        let event = self
            .working
            .events
            .get_mut(&id)
            .ok_or(DomainError::EventNotFound(id))?;

        let rsvp_count = event.rsvp_count + rsvp_delta;
        let attending_count = event.attending_count + attending_delta;
        if attending_count < 0 || attending_count > rsvp_count {
            return Err(check_violation("events_counts_check"));
        }

        event.rsvp_count = rsvp_count;
        event.attending_count = attending_count;
        event.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_attending(&mut self, id: Snowflake) -> RepoResult<()> {
        let event = self
            .working
            .events
            .get_mut(&id)
            .ok_or(DomainError::EventNotFound(id))?;
        event.attending_count = 0;
        event.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        self.working
            .events
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::EventNotFound(id))
    }
}

// ============================================================================
// RSVPs
// ============================================================================

impl MemoryUnitOfWork {
    fn user_rsvps(&self, user_id: Snowflake) -> impl Iterator<Item = &Rsvp> {
        self.working
            .rsvps
            .values()
            .filter(move |r| r.user_id == user_id)
    }

    fn event_rsvps_mut(&mut self, event_id: Snowflake) -> impl Iterator<Item = &mut Rsvp> {
        self.working
            .rsvps
            .values_mut()
            .filter(move |r| r.event_id == event_id)
    }
}

#[async_trait]
impl RsvpRepository for MemoryUnitOfWork {
    async fn find(&mut self, user_id: Snowflake, event_id: Snowflake) -> RepoResult<Option<Rsvp>> {
        Ok(self
            .user_rsvps(user_id)
            .find(|r| r.event_id == event_id)
            .cloned())
    }

    async fn find_by_event(&mut self, event_id: Snowflake) -> RepoResult<Vec<Rsvp>> {
        let mut rsvps: Vec<Rsvp> = self
            .working
            .rsvps
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        rsvps.sort_by_key(|r| (r.created_at, r.id));
        Ok(rsvps)
    }

    async fn find_by_user(&mut self, user_id: Snowflake) -> RepoResult<Vec<Rsvp>> {
        let mut rsvps: Vec<Rsvp> = self.user_rsvps(user_id).cloned().collect();
        rsvps.sort_by_key(|r| (r.start_time, r.event_id));
        Ok(rsvps)
    }

    async fn find_upcoming_by_user(
        &mut self,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Rsvp>> {
        let mut rsvps: Vec<Rsvp> = self
            .user_rsvps(user_id)
            .filter(|r| r.start_time >= now)
            .cloned()
            .collect();
        rsvps.sort_by_key(|r| (r.start_time, r.event_id));
        Ok(rsvps)
    }

    async fn find_past_by_user(
        &mut self,
        user_id: Snowflake,
        now: DateTime<Utc>,
        page: Page,
    ) -> RepoResult<Vec<Rsvp>> {
        let rsvps: Vec<Rsvp> = self
            .user_rsvps(user_id)
            .filter(|r| r.start_time < now)
            .cloned()
            .collect();
        Ok(page_desc(rsvps, page, |r| (r.start_time, r.event_id)))
    }

    async fn find_upcoming_by_user_in_band(
        &mut self,
        user_id: Snowflake,
        band_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Rsvp>> {
        let events = &self.working.events;
        let mut rsvps: Vec<Rsvp> = self
            .user_rsvps(user_id)
            .filter(|r| {
                events
                    .get(&r.event_id)
                    .is_some_and(|e| e.band_id == band_id && e.is_upcoming(now))
            })
            .cloned()
            .collect();
        rsvps.sort_by_key(|r| (r.start_time, r.event_id));
        Ok(rsvps)
    }

    async fn create(&mut self, rsvp: &Rsvp) -> RepoResult<()> {
        let duplicate = self
            .user_rsvps(rsvp.user_id)
            .any(|r| r.event_id == rsvp.event_id);
        if duplicate {
            return Err(DomainError::DatabaseError(format!(
                "rsvp already exists for user {} on event {}",
                rsvp.user_id, rsvp.event_id
            )));
        }

        self.working.rsvps.insert(rsvp.id, rsvp.clone());
        Ok(())
    }

    async fn set_status(&mut self, id: Snowflake, status: RsvpStatus) -> RepoResult<()> {
        let rsvp = self
            .working
            .rsvps
            .get_mut(&id)
            .ok_or_else(|| no_rows("rsvps"))?;
        rsvp.set_status(status);
        Ok(())
    }

    async fn reset_event(&mut self, event_id: Snowflake) -> RepoResult<u64> {
        let mut reset = 0;
        for rsvp in self.event_rsvps_mut(event_id) {
            rsvp.set_status(RsvpStatus::Pending);
            reset += 1;
        }
        Ok(reset)
    }

    async fn set_start_time(
        &mut self,
        event_id: Snowflake,
        start_time: DateTime<Utc>,
    ) -> RepoResult<()> {
        for rsvp in self.event_rsvps_mut(event_id) {
            rsvp.start_time = start_time;
            rsvp.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&mut self, id: Snowflake) -> RepoResult<()> {
        self.working
            .rsvps
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| no_rows("rsvps"))
    }

    async fn delete_by_event(&mut self, event_id: Snowflake) -> RepoResult<u64> {
        let before = self.working.rsvps.len();
        self.working.rsvps.retain(|_, r| r.event_id != event_id);
        Ok((before - self.working.rsvps.len()) as u64)
    }
}
