//! Identity provider webhooks
//!
//! Account lifecycle notifications. Authenticated by a shared secret in the
//! `x-webhook-secret` header rather than a user token.

use axum::{extract::State, http::HeaderMap};
use band_common::AppError;
use band_service::dto::{IdentityEventKind, IdentityWebhookRequest};
use band_service::{IdentityProfile, UserService};
use tracing::{info, warn};

use crate::extractors::JsonBody;
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Header carrying the shared webhook secret
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

fn check_secret(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(secret) if !expected.is_empty() && secret == expected => Ok(()),
        _ => {
            warn!("Rejected identity webhook with a bad secret");
            Err(AppError::InvalidWebhookSecret)
        }
    }
}

/// POST /webhooks/identity
pub async fn identity_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<IdentityWebhookRequest>,
) -> ApiResult<NoContent> {
    check_secret(&headers, state.webhook_secret())?;

    let service = UserService::new(state.service_context());
    match request.kind {
        IdentityEventKind::Created | IdentityEventKind::Updated => {
            let user = service
                .sync_user(IdentityProfile::from(&request.data))
                .await?;
            info!(user_id = %user.id, kind = ?request.kind, "Identity synced");
        }
        IdentityEventKind::Deleted => {
            let deleted = service.delete_user(&request.data.id).await?;
            info!(deleted, "Identity deleted");
        }
    }

    Ok(NoContent)
}
