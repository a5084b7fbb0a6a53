//! Band entity - a named roster that owns memberships and events

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Band entity
///
/// `member_count` caches the number of memberships with an active role
/// (member or admin). It is only ever changed together with those rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub id: Snowflake,
    pub name: String,
    pub member_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Band {
    /// Create a new Band counting its founding admin
    pub fn new(id: Snowflake, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            member_count: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the band name
    pub fn set_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }
}
