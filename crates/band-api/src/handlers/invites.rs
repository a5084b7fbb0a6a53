//! Invite handlers
//!
//! The invitee's side of an invitation.

use axum::{
    extract::{Path, State},
    Json,
};
use band_service::dto::MembershipResponse;
use band_service::MembershipService;

use crate::extractors::{CurrentUser, MembershipIdPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Accept an invitation and become a member
///
/// POST /invites/{membership_id}/accept
pub async fn accept_invite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<MembershipIdPath>,
) -> ApiResult<Json<MembershipResponse>> {
    let service = MembershipService::new(state.service_context());
    let response = service.accept(path.membership_id()?, user.id()).await?;
    Ok(Json(response))
}

/// Decline an invitation
///
/// DELETE /invites/{membership_id}
pub async fn decline_invite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<MembershipIdPath>,
) -> ApiResult<NoContent> {
    let service = MembershipService::new(state.service_context());
    service.decline(path.membership_id()?, user.id()).await?;
    Ok(NoContent)
}
