//! User entity - an application user mirrored from the identity provider

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Username used when the identity provider supplies no nickname
pub const DEFAULT_USERNAME: &str = "user";

/// User entity
///
/// `token_identifier` is the identity provider's subject and never changes;
/// `username` and `display_name` follow the provider's claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub token_identifier: String,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User
    pub fn new(
        id: Snowflake,
        token_identifier: String,
        username: String,
        display_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            token_identifier,
            username,
            display_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Username derived from a nickname claim
    pub fn username_from(nickname: Option<&str>) -> String {
        nickname
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_USERNAME)
            .to_string()
    }

    /// Display name derived from given and family name claims, falling back to the username
    pub fn display_name_from(
        given_name: Option<&str>,
        family_name: Option<&str>,
        username: &str,
    ) -> String {
        let full = format!(
            "{} {}",
            given_name.unwrap_or_default(),
            family_name.unwrap_or_default()
        );
        let full = full.trim();

        if full.is_empty() {
            username.to_string()
        } else {
            full.to_string()
        }
    }

    /// Whether the stored profile already matches the given claims
    #[inline]
    pub fn matches_profile(&self, username: &str, display_name: &str) -> bool {
        self.username == username && self.display_name == display_name
    }

    /// Replace username and display name
    pub fn set_profile(&mut self, username: String, display_name: String) {
        self.username = username;
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }
}
