//! Current user handlers
//!
//! Everything under `/users/@me`: the caller's profile, bands, invites,
//! memberships and event feeds.

use axum::{extract::State, Json};
use band_service::dto::{
    BandSummaryResponse, EventCardResponse, EventPageResponse, InviteResponse,
    MembershipResponse, UserResponse,
};
use band_service::{BandService, EventService, MembershipService};

use crate::extractors::{CurrentUser, Pagination};
use crate::response::ApiResult;
use crate::state::AppState;

/// Get the current user
///
/// GET /users/@me
pub async fn get_current_user(user: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.0))
}

/// Bands the current user belongs to, newest first
///
/// GET /users/@me/bands
pub async fn get_current_user_bands(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<BandSummaryResponse>>> {
    let service = BandService::new(state.service_context());
    let response = service.list_bands_for_user(user.id()).await?;
    Ok(Json(response))
}

/// Invitations waiting for the current user
///
/// GET /users/@me/invites
pub async fn get_pending_invites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let service = MembershipService::new(state.service_context());
    let response = service.list_pending_invites(user.id()).await?;
    Ok(Json(response))
}

/// GET /users/@me/memberships
pub async fn get_active_memberships(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<MembershipResponse>>> {
    let service = MembershipService::new(state.service_context());
    let response = service.list_active_memberships(user.id()).await?;
    Ok(Json(response))
}

/// Upcoming events across all of the user's bands
///
/// GET /users/@me/events/upcoming
pub async fn get_upcoming_events(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<EventCardResponse>>> {
    let service = EventService::new(state.service_context());
    let response = service.list_upcoming_events_for_user(user.id()).await?;
    Ok(Json(response))
}

/// Past events across all of the user's bands, latest first
///
/// GET /users/@me/events/past?limit=&cursor=
pub async fn get_past_events(
    State(state): State<AppState>,
    user: CurrentUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<EventPageResponse>> {
    let service = EventService::new(state.service_context());
    let response = service.list_past_events_for_user(user.id(), page).await?;
    Ok(Json(response))
}
