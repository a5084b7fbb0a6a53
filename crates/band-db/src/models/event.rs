//! Event database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for events table
#[derive(Debug, Clone, FromRow)]
pub struct EventModel {
    pub id: i64,
    pub band_id: i64,
    pub name: Option<String>,
    pub event_type: String,
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub rsvp_count: i32,
    pub attending_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
