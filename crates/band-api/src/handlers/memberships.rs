//! Membership handlers

use axum::{
    extract::{Path, State},
    Json,
};
use band_service::dto::MemberResponse;
use band_service::MembershipService;

use crate::extractors::{CurrentUser, MembershipIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Promote a member to admin
///
/// POST /memberships/{membership_id}/promote
pub async fn promote_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(path): Path<MembershipIdPath>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MembershipService::new(state.service_context());
    let response = service.promote(path.membership_id()?, user.id()).await?;
    Ok(Json(response))
}
