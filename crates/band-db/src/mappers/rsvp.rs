//! RSVP entity <-> model mapper

use band_core::entities::Rsvp;
use band_core::error::DomainError;
use band_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::RsvpModel;

impl TryFrom<RsvpModel> for Rsvp {
    type Error = DomainError;

    fn try_from(model: RsvpModel) -> Result<Self, Self::Error> {
        Ok(Rsvp {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            event_id: Snowflake::new(model.event_id),
            status: parse_column("status", &model.status)?,
            start_time: model.start_time,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
