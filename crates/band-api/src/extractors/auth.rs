//! Authentication extractor
//!
//! Verifies the identity provider's bearer token and resolves it to an
//! application user, creating or refreshing the user on the way.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use band_core::entities::User;
use band_core::Snowflake;
use band_service::{IdentityProfile, UserService};

use crate::response::ApiError;
use crate::state::AppState;

/// Application user behind the request's identity token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Snowflake {
        self.0.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::not_authenticated())?;

        let app_state = AppState::from_ref(state);

        let claims = app_state
            .identity_verifier()
            .verify(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected identity token");
                ApiError::not_authenticated()
            })?;

        // Runs in its own unit of work, finished before the handler opens one
        let user = UserService::new(app_state.service_context())
            .sync_user(IdentityProfile::from(&claims))
            .await?;

        Ok(CurrentUser(user))
    }
}
