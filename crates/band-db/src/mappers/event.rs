//! Event entity <-> model mapper

use band_core::entities::Event;
use band_core::error::DomainError;
use band_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::EventModel;

impl TryFrom<EventModel> for Event {
    type Error = DomainError;

    fn try_from(model: EventModel) -> Result<Self, Self::Error> {
        Ok(Event {
            id: Snowflake::new(model.id),
            band_id: Snowflake::new(model.band_id),
            name: model.name,
            event_type: parse_column("event_type", &model.event_type)?,
            start_time: model.start_time,
            location: model.location,
            description: model.description,
            rsvp_count: model.rsvp_count,
            attending_count: model.attending_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
