//! Band handlers
//!
//! Endpoints for band management, invitations, departures and band events.

use axum::{
    extract::{Path, State},
    Json,
};
use band_service::dto::{
    BandPageResponse, BandResponse, CreateBandRequest, CreateEventRequest, EventCardResponse,
    EventPageResponse, EventResponse, InviteRequest, MemberResponse, RenameBandRequest,
};
use band_service::{BandService, EventService, MembershipService};
use tracing::info;

use crate::extractors::{BandIdPath, BandUserPath, CurrentUser, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create a new band with the caller as its only admin
///
/// POST /bands
pub async fn create_band(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateBandRequest>,
) -> ApiResult<Created<Json<BandResponse>>> {
    let service = BandService::new(state.service_context());
    let response = service.create_band(user.id(), request).await?;
    Ok(Created(Json(response)))
}

/// Band page: band, roster and the caller's standing
///
/// GET /bands/{band_id}
pub async fn get_band(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
) -> ApiResult<Json<BandPageResponse>> {
    let service = BandService::new(state.service_context());
    let response = service.get_band_page(path.band_id()?, user.id()).await?;
    Ok(Json(response))
}

/// PATCH /bands/{band_id}
pub async fn rename_band(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
    ValidatedJson(request): ValidatedJson<RenameBandRequest>,
) -> ApiResult<Json<BandResponse>> {
    let service = BandService::new(state.service_context());
    let response = service
        .rename_band(path.band_id()?, user.id(), request)
        .await?;
    Ok(Json(response))
}

/// Delete a band with its events, RSVPs and memberships
///
/// DELETE /bands/{band_id}
pub async fn delete_band(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
) -> ApiResult<NoContent> {
    let service = BandService::new(state.service_context());
    service.delete_band(path.band_id()?, user.id()).await?;
    Ok(NoContent)
}

/// Invite a user by username
///
/// POST /bands/{band_id}/invites
pub async fn invite_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
    ValidatedJson(request): ValidatedJson<InviteRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MembershipService::new(state.service_context());
    let response = service.invite(path.band_id()?, user.id(), request).await?;
    Ok(Created(Json(response)))
}

/// Leave a band
///
/// DELETE /bands/{band_id}/members/@me
pub async fn leave_band(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
) -> ApiResult<NoContent> {
    let band_id = path.band_id()?;
    let service = MembershipService::new(state.service_context());
    let departure = service.leave(band_id, user.id()).await?;
    info!(band_id = %band_id, ?departure, "Left band");
    Ok(NoContent)
}

/// Remove a member from a band
///
/// DELETE /bands/{band_id}/members/{user_id}
pub async fn kick_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandUserPath>,
) -> ApiResult<NoContent> {
    let service = MembershipService::new(state.service_context());
    service
        .kick(path.band_id()?, path.user_id()?, user.id())
        .await?;
    Ok(NoContent)
}

/// GET /bands/{band_id}/events/upcoming
pub async fn get_upcoming_events(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
) -> ApiResult<Json<Vec<EventCardResponse>>> {
    let service = EventService::new(state.service_context());
    let response = service
        .list_upcoming_events_for_band(path.band_id()?, user.id())
        .await?;
    Ok(Json(response))
}

/// GET /bands/{band_id}/events/past?limit=&cursor=
pub async fn get_past_events(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
    Pagination(page): Pagination,
) -> ApiResult<Json<EventPageResponse>> {
    let service = EventService::new(state.service_context());
    let response = service
        .list_past_events_for_band(path.band_id()?, user.id(), page)
        .await?;
    Ok(Json(response))
}

/// Schedule an event
///
/// POST /bands/{band_id}/events
pub async fn create_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<BandIdPath>,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> ApiResult<Created<Json<EventResponse>>> {
    let service = EventService::new(state.service_context());
    let response = service
        .create_event(path.band_id()?, user.id(), request)
        .await?;
    Ok(Created(Json(response)))
}
