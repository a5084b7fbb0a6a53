//! Event handlers
//!
//! Editing, cancelling and answering events.

use axum::{
    extract::{Path, State},
    Json,
};
use band_service::dto::{
    AttendeeResponse, EventResponse, RsvpResponse, SetRsvpRequest, UpdateEventRequest,
};
use band_service::{EventService, RsvpService};

use crate::extractors::{CurrentUser, EventIdPath, JsonBody, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Edit an event; a new start time resets every answer to pending
///
/// PATCH /events/{event_id}
pub async fn update_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<EventIdPath>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let service = EventService::new(state.service_context());
    let response = service
        .update_event(path.event_id()?, user.id(), request)
        .await?;
    Ok(Json(response))
}

/// DELETE /events/{event_id}
pub async fn delete_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<EventIdPath>,
) -> ApiResult<NoContent> {
    let service = EventService::new(state.service_context());
    service.delete_event(path.event_id()?, user.id()).await?;
    Ok(NoContent)
}

/// Every member's answer for an event
///
/// GET /events/{event_id}/attendees
pub async fn get_attendees(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<EventIdPath>,
) -> ApiResult<Json<Vec<AttendeeResponse>>> {
    let service = EventService::new(state.service_context());
    let response = service
        .get_event_attendees(path.event_id()?, user.id())
        .await?;
    Ok(Json(response))
}

/// Answer an event
///
/// PUT /events/{event_id}/rsvp
pub async fn set_rsvp(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<EventIdPath>,
    JsonBody(request): JsonBody<SetRsvpRequest>,
) -> ApiResult<Json<RsvpResponse>> {
    let service = RsvpService::new(state.service_context());
    let response = service
        .set_status(path.event_id()?, user.id(), request)
        .await?;
    Ok(Json(response))
}
