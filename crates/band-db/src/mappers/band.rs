//! Band entity <-> model mapper

use band_core::entities::Band;
use band_core::value_objects::Snowflake;

use crate::models::BandModel;

impl From<BandModel> for Band {
    fn from(model: BandModel) -> Self {
        Band {
            id: Snowflake::new(model.id),
            name: model.name,
            member_count: model.member_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
