//! Membership entity <-> model mapper

use band_core::entities::Membership;
use band_core::error::DomainError;
use band_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::MembershipModel;

impl TryFrom<MembershipModel> for Membership {
    type Error = DomainError;

    fn try_from(model: MembershipModel) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: Snowflake::new(model.id),
            band_id: Snowflake::new(model.band_id),
            user_id: Snowflake::new(model.user_id),
            role: parse_column("role", &model.role)?,
            invited_by: model.invited_by.map(Snowflake::new),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
