//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use band_core::{BandRole, EventType, RsvpStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// User Responses
// ============================================================================

/// Application user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Band Responses
// ============================================================================

/// Basic band response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandResponse {
    pub id: String,
    pub name: String,
    pub member_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Band as listed on the caller's home page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandSummaryResponse {
    #[serde(flatten)]
    pub band: BandResponse,
    pub is_admin: bool,
    pub upcoming_events_count: i64,
}

/// Band detail page with its full roster
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandPageResponse {
    pub band: BandResponse,
    pub members: Vec<MemberResponse>,
    pub current_user_id: String,
    pub is_admin: bool,
}

// ============================================================================
// Membership Responses
// ============================================================================

/// One roster row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub membership_id: String,
    pub user_id: String,
    pub display_name: String,
    pub role: BandRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pending invite addressed to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub membership_id: String,
    pub band_id: String,
    pub band_name: String,
    /// Display name of the inviter, absent if their account is gone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One of the caller's memberships
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub membership_id: String,
    pub band_id: String,
    pub band_name: String,
    pub role: BandRole,
}

// ============================================================================
// Event Responses
// ============================================================================

/// Event with its aggregate counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub band_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rsvp_count: i32,
    pub attending_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Event enriched for the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCardResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub band_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_status: Option<RsvpStatus>,
    pub is_admin: bool,
}

/// One page of past events, latest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPageResponse {
    pub events: Vec<EventCardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// One attendee row of an event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeResponse {
    pub user_id: String,
    pub display_name: String,
    pub status: RsvpStatus,
}

/// The caller's RSVP
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub status: RsvpStatus,
    pub start_time: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
