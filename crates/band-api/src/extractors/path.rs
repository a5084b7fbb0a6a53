//! Path parameter extractors
//!
//! Type-safe extraction of Snowflake IDs from path parameters.

use band_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with band_id
#[derive(Debug, Deserialize)]
pub struct BandIdPath {
    pub band_id: String,
}

impl BandIdPath {
    pub fn band_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.band_id, "band_id")
    }
}

/// Path parameters with band_id and user_id
#[derive(Debug, Deserialize)]
pub struct BandUserPath {
    pub band_id: String,
    pub user_id: String,
}

impl BandUserPath {
    pub fn band_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.band_id, "band_id")
    }

    pub fn user_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.user_id, "user_id")
    }
}

/// Path parameters with event_id
#[derive(Debug, Deserialize)]
pub struct EventIdPath {
    pub event_id: String,
}

impl EventIdPath {
    pub fn event_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.event_id, "event_id")
    }
}

/// Path parameters with membership_id, used for invites and promotions
#[derive(Debug, Deserialize)]
pub struct MembershipIdPath {
    pub membership_id: String,
}

impl MembershipIdPath {
    pub fn membership_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.membership_id, "membership_id")
    }
}
