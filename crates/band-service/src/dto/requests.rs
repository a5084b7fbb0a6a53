//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Field names are camelCase on the wire.

use band_core::{EventPatch, EventType, RsvpStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Band Requests
// ============================================================================

/// Create band request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBandRequest {
    #[validate(length(min = 1, max = 100, message = "Band name must be 1-100 characters"))]
    pub name: String,
}

/// Rename band request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameBandRequest {
    #[validate(length(min = 1, max = 100, message = "Band name must be 1-100 characters"))]
    pub name: String,
}

// ============================================================================
// Membership Requests
// ============================================================================

/// Invite a user to a band by username
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
}

// ============================================================================
// Event Requests
// ============================================================================

/// Create event request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(max = 100, message = "Event name must be at most 100 characters"))]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub event_type: EventType,

    pub start_time: DateTime<Utc>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl CreateEventRequest {
    /// Descriptive fields as a patch over a bare event
    pub fn details(&self) -> EventPatch {
        EventPatch {
            name: self.name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            ..EventPatch::default()
        }
    }
}

/// Update event request
///
/// Absent fields are left as they are; an empty string clears a text field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(max = 100, message = "Event name must be at most 100 characters"))]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub event_type: Option<EventType>,

    pub start_time: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(request: UpdateEventRequest) -> Self {
        Self {
            name: request.name,
            event_type: request.event_type,
            start_time: request.start_time,
            location: request.location,
            description: request.description,
        }
    }
}

/// Set the caller's RSVP status for an event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRsvpRequest {
    pub status: RsvpStatus,
}

// ============================================================================
// Identity Webhook
// ============================================================================

/// Account lifecycle notification from the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityWebhookRequest {
    #[serde(rename = "type")]
    pub kind: IdentityEventKind,
    pub data: IdentityWebhookUser,
}

/// Lifecycle event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum IdentityEventKind {
    #[serde(rename = "user.created")]
    Created,
    #[serde(rename = "user.updated")]
    Updated,
    #[serde(rename = "user.deleted")]
    Deleted,
}

/// User payload of a lifecycle event
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityWebhookUser {
    /// Identity provider subject
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
