//! Band roles and the capability check shared by every band-scoped operation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Role a user holds in a band
///
/// Lifecycle: `Invited` -> `Member` -> `Admin`. Demotion does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandRole {
    Invited,
    Member,
    Admin,
}

impl BandRole {
    /// Stable string form used in storage
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    /// Members and admins are active; invitees are not
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Member | Self::Admin)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for BandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BandRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(Self::Invited),
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::ValidationError(format!("unknown band role: {other}"))),
        }
    }
}

/// What an operation needs from the caller's membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read band data, RSVP, leave: requires an active membership
    Participate,
    /// Invite, promote, kick, rename, delete, manage events: requires admin
    Manage,
}

impl Capability {
    /// Check a caller's role (or lack of membership) against this capability
    ///
    /// The error tells the three refusal cases apart: no membership at all,
    /// an invite that was never accepted, and a plain member asking for an
    /// admin action.
    pub fn authorize(self, role: Option<BandRole>) -> Result<(), DomainError> {
        match (self, role) {
            (_, None) => Err(DomainError::NotAMember),
            (_, Some(BandRole::Invited)) => Err(DomainError::InviteNotAccepted),
            (Self::Manage, Some(BandRole::Member)) => Err(DomainError::NotAnAdmin),
            (Self::Participate, Some(BandRole::Member | BandRole::Admin))
            | (Self::Manage, Some(BandRole::Admin)) => Ok(()),
        }
    }
}
