//! Pagination extractor
//!
//! Keyset pagination over past events: `?limit=N&cursor=<millis>:<id>`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use band_core::{EventCursor, Page};
use serde::Deserialize;

use crate::response::ApiError;

/// Raw pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    /// Opaque position returned as `nextCursor` by the previous page
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Validated page request
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination(pub Page);

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let before = params
            .cursor
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<EventCursor>()
                    .map_err(|_| ApiError::invalid_query("Invalid 'cursor' format"))
            })
            .transpose()?;

        Ok(Pagination(Page::new(params.limit, before)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Pagination::try_from(params)
    }
}
