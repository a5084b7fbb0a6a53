//! Band database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for bands table
#[derive(Debug, Clone, FromRow)]
pub struct BandModel {
    pub id: i64,
    pub name: String,
    pub member_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
