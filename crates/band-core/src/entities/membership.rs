//! Membership entity - a user's role in a band

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::{BandRole, Snowflake};

/// Membership entity (junction between User and Band)
///
/// Unique per `(user_id, band_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub id: Snowflake,
    pub band_id: Snowflake,
    pub user_id: Snowflake,
    pub role: BandRole,
    pub invited_by: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    fn with_role(
        id: Snowflake,
        band_id: Snowflake,
        user_id: Snowflake,
        role: BandRole,
        invited_by: Option<Snowflake>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            band_id,
            user_id,
            role,
            invited_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Admin membership of the user who created the band
    pub fn founder(id: Snowflake, band_id: Snowflake, user_id: Snowflake) -> Self {
        Self::with_role(id, band_id, user_id, BandRole::Admin, None)
    }

    /// Pending invite sent by `invited_by`
    pub fn invite(
        id: Snowflake,
        band_id: Snowflake,
        user_id: Snowflake,
        invited_by: Snowflake,
    ) -> Self {
        Self::with_role(id, band_id, user_id, BandRole::Invited, Some(invited_by))
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.role.is_active()
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[inline]
    pub fn belongs_to(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }

    /// Ordering key for admin succession: earliest creation first
    #[inline]
    pub fn seniority(&self) -> (DateTime<Utc>, Snowflake) {
        (self.created_at, self.id)
    }

    /// Invited -> Member
    pub fn accept(&mut self) -> Result<(), DomainError> {
        if self.role != BandRole::Invited {
            return Err(DomainError::InvalidTarget(
                "Invite was already accepted".to_string(),
            ));
        }
        self.role = BandRole::Member;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Member -> Admin. Returns false when already an admin.
    pub fn promote(&mut self) -> Result<bool, DomainError> {
        match self.role {
            BandRole::Invited => Err(DomainError::target_not_yet_member()),
            BandRole::Admin => Ok(false),
            BandRole::Member => {
                self.role = BandRole::Admin;
                self.updated_at = Utc::now();
                Ok(true)
            }
        }
    }

    /// Check that an admin may remove this membership
    pub fn ensure_kickable(&self) -> Result<(), DomainError> {
        match self.role {
            BandRole::Admin => Err(DomainError::target_is_admin()),
            BandRole::Invited => Err(DomainError::target_not_yet_member()),
            BandRole::Member => Ok(()),
        }
    }
}
