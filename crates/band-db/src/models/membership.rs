//! Membership database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for memberships table
#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub id: i64,
    pub band_id: i64,
    pub user_id: i64,
    /// One of `invited`, `member`, `admin`
    pub role: String,
    pub invited_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
