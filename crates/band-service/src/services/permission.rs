//! Permission service
//!
//! One check for every band-scoped operation: load the caller's membership
//! and hold its role against the capability the operation needs.

use band_core::entities::Membership;
use band_core::traits::UnitOfWork;
use band_core::{Capability, DomainError, Snowflake};
use tracing::{debug, instrument};

use super::error::ServiceResult;

/// Permission checks inside an open unit of work
pub struct PermissionService<'u> {
    uow: &'u mut dyn UnitOfWork,
}

impl<'u> PermissionService<'u> {
    /// Create a new PermissionService
    pub fn new(uow: &'u mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    /// Require `capability` of `user_id` in `band_id`, returning the membership
    ///
    /// A band that does not exist is reported as not found rather than as a
    /// missing membership.
    #[instrument(skip(self))]
    pub async fn require(
        self,
        band_id: Snowflake,
        user_id: Snowflake,
        capability: Capability,
    ) -> ServiceResult<Membership> {
        let membership = self.uow.memberships().find(band_id, user_id).await?;

        if membership.is_none() && self.uow.bands().find_by_id(band_id).await?.is_none() {
            return Err(DomainError::BandNotFound(band_id).into());
        }

        let role = membership.as_ref().map(|m| m.role);
        if let Err(err) = capability.authorize(role) {
            debug!(band_id = %band_id, user_id = %user_id, ?role, ?capability, "Permission denied");
            return Err(err.into());
        }

        debug!(band_id = %band_id, user_id = %user_id, ?role, ?capability, "Permission granted");
        membership.ok_or_else(|| DomainError::NotAMember.into())
    }
}
