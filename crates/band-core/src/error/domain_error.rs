//! Domain errors - user-facing failures of band operations

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
///
/// Every message is safe to show to an end user.
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Authentication Errors
    // =========================================================================
    #[error("You must be signed in to do this.")]
    NotAuthenticated,

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Band not found: {0}")]
    BandNotFound(Snowflake),

    #[error("Event not found: {0}")]
    EventNotFound(Snowflake),

    #[error("Membership not found")]
    MembershipNotFound,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("You are not a member of this band.")]
    NotAMember,

    #[error("You must accept your invite to access this.")]
    InviteNotAccepted,

    #[error("You must be an admin to perform this action.")]
    NotAnAdmin,

    #[error("This isn't your invite.")]
    NotYours,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("User is already member or invited.")]
    AlreadyInvitedOrMember,

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",

            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::BandNotFound(_) => "UNKNOWN_BAND",
            Self::EventNotFound(_) => "UNKNOWN_EVENT",
            Self::MembershipNotFound => "UNKNOWN_MEMBERSHIP",

            // Authorization
            Self::NotAMember => "NOT_A_MEMBER",
            Self::InviteNotAccepted => "INVITE_NOT_ACCEPTED",
            Self::NotAnAdmin => "NOT_AN_ADMIN",
            Self::NotYours => "NOT_YOURS",

            // Conflict
            Self::AlreadyInvitedOrMember => "ALREADY_INVITED_OR_MEMBER",
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::UsernameTaken(_) => "USERNAME_TAKEN",

            Self::ValidationError(_) => "VALIDATION_ERROR",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Kick target is an admin
    pub fn target_is_admin() -> Self {
        Self::InvalidTarget("Target is admin".to_string())
    }

    /// Kick target has not accepted their invite
    pub fn target_not_yet_member() -> Self {
        Self::InvalidTarget("Target is not yet a member".to_string())
    }

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::BandNotFound(_)
                | Self::EventNotFound(_)
                | Self::MembershipNotFound
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotAMember | Self::InviteNotAccepted | Self::NotAnAdmin | Self::NotYours
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInvitedOrMember | Self::InvalidTarget(_) | Self::UsernameTaken(_)
        )
    }
}
