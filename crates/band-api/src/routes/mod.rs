//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{bands, events, health, invites, memberships, users, webhooks};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(band_routes())
        .merge(invite_routes())
        .merge(membership_routes())
        .merge(event_routes())
        .merge(webhook_routes())
}

/// Current user routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_current_user))
        .route("/users/@me/bands", get(users::get_current_user_bands))
        .route("/users/@me/invites", get(users::get_pending_invites))
        .route("/users/@me/memberships", get(users::get_active_memberships))
        .route("/users/@me/events/upcoming", get(users::get_upcoming_events))
        .route("/users/@me/events/past", get(users::get_past_events))
}

/// Band routes
fn band_routes() -> Router<AppState> {
    Router::new()
        .route("/bands", post(bands::create_band))
        .route(
            "/bands/:band_id",
            get(bands::get_band)
                .patch(bands::rename_band)
                .delete(bands::delete_band),
        )
        // Membership
        .route("/bands/:band_id/invites", post(bands::invite_member))
        .route("/bands/:band_id/members/@me", delete(bands::leave_band))
        .route("/bands/:band_id/members/:user_id", delete(bands::kick_member))
        // Events
        .route("/bands/:band_id/events", post(bands::create_event))
        .route("/bands/:band_id/events/upcoming", get(bands::get_upcoming_events))
        .route("/bands/:band_id/events/past", get(bands::get_past_events))
}

fn invite_routes() -> Router<AppState> {
    Router::new()
        .route("/invites/:membership_id", delete(invites::decline_invite))
        .route("/invites/:membership_id/accept", post(invites::accept_invite))
}

fn membership_routes() -> Router<AppState> {
    Router::new().route(
        "/memberships/:membership_id/promote",
        post(memberships::promote_member),
    )
}

/// Event routes
fn event_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/:event_id",
            patch(events::update_event).delete(events::delete_event),
        )
        .route("/events/:event_id/attendees", get(events::get_attendees))
        .route("/events/:event_id/rsvp", put(events::set_rsvp))
}

fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhooks/identity", post(webhooks::identity_event))
}
