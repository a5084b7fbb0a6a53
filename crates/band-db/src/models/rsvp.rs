//! RSVP database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rsvps table
#[derive(Debug, Clone, FromRow)]
pub struct RsvpModel {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub status: String,
    /// Copy of the event's start time
    pub start_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
