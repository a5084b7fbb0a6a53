//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    CreateBandRequest, CreateEventRequest, IdentityEventKind, IdentityWebhookRequest,
    IdentityWebhookUser, InviteRequest, RenameBandRequest, SetRsvpRequest, UpdateEventRequest,
};

// Re-export commonly used response types
pub use responses::{
    AttendeeResponse, BandPageResponse, BandResponse, BandSummaryResponse, EventCardResponse,
    EventPageResponse, EventResponse, HealthChecks, HealthResponse, InviteResponse,
    MemberResponse, MembershipResponse, ReadinessResponse, RsvpResponse, UserResponse,
};

// Re-export mappers and helper structs
pub use mappers::{BandWithStanding, EventCard, InviteWithDetails, MemberWithUser};
