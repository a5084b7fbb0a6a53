//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use band_core::entities::{Band, Event, Membership, Rsvp, User};
use band_core::RsvpStatus;

use super::responses::{
    AttendeeResponse, BandResponse, BandSummaryResponse, EventCardResponse, EventResponse,
    InviteResponse, MemberResponse, MembershipResponse, RsvpResponse, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Band Mappers
// ============================================================================

impl From<&Band> for BandResponse {
    fn from(band: &Band) -> Self {
        Self {
            id: band.id.to_string(),
            name: band.name.clone(),
            member_count: band.member_count,
            created_at: band.created_at,
        }
    }
}

impl From<Band> for BandResponse {
    fn from(band: Band) -> Self {
        Self::from(&band)
    }
}

/// Band with the caller's view of it
pub struct BandWithStanding {
    pub band: Band,
    pub is_admin: bool,
    pub upcoming_events_count: i64,
}

impl From<BandWithStanding> for BandSummaryResponse {
    fn from(data: BandWithStanding) -> Self {
        Self {
            band: BandResponse::from(&data.band),
            is_admin: data.is_admin,
            upcoming_events_count: data.upcoming_events_count,
        }
    }
}

// ============================================================================
// Membership Mappers
// ============================================================================

/// Membership joined with its user
pub struct MemberWithUser<'a> {
    pub membership: &'a Membership,
    pub user: Option<&'a User>,
}

impl From<MemberWithUser<'_>> for MemberResponse {
    fn from(data: MemberWithUser<'_>) -> Self {
        let membership = data.membership;
        Self {
            membership_id: membership.id.to_string(),
            user_id: membership.user_id.to_string(),
            display_name: data
                .user
                .map(|u| u.display_name.clone())
                .unwrap_or_default(),
            role: membership.role,
            invited_by: membership.invited_by.map(|id| id.to_string()),
            created_at: membership.created_at,
        }
    }
}

/// Pending invite joined with its band and inviter
pub struct InviteWithDetails<'a> {
    pub membership: &'a Membership,
    pub band: &'a Band,
    pub inviter: Option<&'a User>,
}

impl From<InviteWithDetails<'_>> for InviteResponse {
    fn from(data: InviteWithDetails<'_>) -> Self {
        Self {
            membership_id: data.membership.id.to_string(),
            band_id: data.band.id.to_string(),
            band_name: data.band.name.clone(),
            invited_by: data.inviter.map(|u| u.display_name.clone()),
            created_at: data.membership.created_at,
        }
    }
}

impl From<(&Membership, &Band)> for MembershipResponse {
    fn from((membership, band): (&Membership, &Band)) -> Self {
        Self {
            membership_id: membership.id.to_string(),
            band_id: band.id.to_string(),
            band_name: band.name.clone(),
            role: membership.role,
        }
    }
}

// ============================================================================
// Event Mappers
// ============================================================================

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            band_id: event.band_id.to_string(),
            name: event.name.clone(),
            event_type: event.event_type,
            start_time: event.start_time,
            location: event.location.clone(),
            description: event.description.clone(),
            rsvp_count: event.rsvp_count,
            attending_count: event.attending_count,
            created_at: event.created_at,
        }
    }
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self::from(&event)
    }
}

/// Event with everything the caller needs to render it
pub struct EventCard<'a> {
    pub event: &'a Event,
    pub band_name: &'a str,
    pub my_status: Option<RsvpStatus>,
    pub is_admin: bool,
}

impl From<EventCard<'_>> for EventCardResponse {
    fn from(card: EventCard<'_>) -> Self {
        Self {
            event: EventResponse::from(card.event),
            band_name: card.band_name.to_string(),
            my_status: card.my_status,
            is_admin: card.is_admin,
        }
    }
}

// ============================================================================
// RSVP Mappers
// ============================================================================

impl From<&Rsvp> for RsvpResponse {
    fn from(rsvp: &Rsvp) -> Self {
        Self {
            id: rsvp.id.to_string(),
            event_id: rsvp.event_id.to_string(),
            user_id: rsvp.user_id.to_string(),
            status: rsvp.status,
            start_time: rsvp.start_time,
        }
    }
}

impl From<(&Rsvp, Option<&User>)> for AttendeeResponse {
    fn from((rsvp, user): (&Rsvp, Option<&User>)) -> Self {
        Self {
            user_id: rsvp.user_id.to_string(),
            display_name: user.map(|u| u.display_name.clone()).unwrap_or_default(),
            status: rsvp.status,
        }
    }
}
