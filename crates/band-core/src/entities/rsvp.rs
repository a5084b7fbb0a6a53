//! RSVP entity - one user's attendance response to one event

use chrono::{DateTime, Utc};

use crate::value_objects::{RsvpStatus, Snowflake};

/// RSVP entity
///
/// Unique per `(user_id, event_id)`. `start_time` mirrors the event's start
/// time so a user's RSVPs can be range-scanned without touching events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsvp {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub event_id: Snowflake,
    pub status: RsvpStatus,
    pub start_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rsvp {
    /// Create a new RSVP
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        event_id: Snowflake,
        status: RsvpStatus,
        start_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            event_id,
            status,
            start_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pending RSVP created for a member when an event appears or they join
    pub fn pending(
        id: Snowflake,
        user_id: Snowflake,
        event_id: Snowflake,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self::new(id, user_id, event_id, RsvpStatus::Pending, start_time)
    }

    /// Change the status, returning the resulting change in attending count
    pub fn set_status(&mut self, status: RsvpStatus) -> i32 {
        let delta = self.status.attending_delta(status);
        self.status = status;
        self.updated_at = Utc::now();
        delta
    }
}
