//! Band service
//!
//! Handles band creation, renaming, deletion and the band-level read paths.

use std::collections::HashMap;

use band_core::entities::{Band, Membership};
use band_core::traits::UnitOfWork;
use band_core::{Capability, DomainError, Snowflake};
use chrono::Utc;
use tracing::{info, instrument};

use crate::dto::{
    BandPageResponse, BandResponse, BandSummaryResponse, BandWithStanding, CreateBandRequest,
    MemberResponse, MemberWithUser, RenameBandRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Band service
pub struct BandService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BandService<'a> {
    /// Create a new BandService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a band with the caller as its only admin
    #[instrument(skip(self, request))]
    pub async fn create_band(
        &self,
        owner_id: Snowflake,
        request: CreateBandRequest,
    ) -> ServiceResult<BandResponse> {
        let band = Band::new(self.ctx.generate_id(), request.name);
        let founder = Membership::founder(self.ctx.generate_id(), band.id, owner_id);

        let mut uow = self.ctx.begin().await?;
        uow.bands().create(&band).await?;
        uow.memberships().create(&founder).await?;
        uow.commit().await?;

        info!(band_id = %band.id, owner_id = %owner_id, "Band created");
        Ok(BandResponse::from(&band))
    }

    /// Rename a band (admin only)
    #[instrument(skip(self, request))]
    pub async fn rename_band(
        &self,
        band_id: Snowflake,
        user_id: Snowflake,
        request: RenameBandRequest,
    ) -> ServiceResult<BandResponse> {
        let mut uow = self.ctx.begin().await?;

        PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Manage)
            .await?;

        let mut band = uow
            .bands()
            .find_by_id(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        if band.name != request.name {
            band.set_name(request.name);
            uow.bands().rename(band_id, &band.name).await?;
            uow.commit().await?;
            info!(band_id = %band_id, "Band renamed");
        }

        Ok(BandResponse::from(&band))
    }

    /// Delete a band with all its events, RSVPs and memberships (admin only)
    #[instrument(skip(self))]
    pub async fn delete_band(&self, band_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut uow = self.ctx.begin().await?;

        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Manage)
            .await?;

        Self::delete_cascade(uow.as_mut(), band_id).await?;
        uow.commit().await?;

        info!(band_id = %band_id, deleted_by = %user_id, "Band deleted");
        Ok(())
    }

    /// Bands where the caller is an active member, newest first
    #[instrument(skip(self))]
    pub async fn list_bands_for_user(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<BandSummaryResponse>> {
        let mut uow = self.ctx.begin().await?;

        let admin_of: HashMap<Snowflake, bool> = uow
            .memberships()
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(Membership::is_active)
            .map(|m| (m.band_id, m.is_admin()))
            .collect();

        let band_ids: Vec<Snowflake> = admin_of.keys().copied().collect();
        let bands = uow.bands().find_many(&band_ids).await?;

        let now = Utc::now();
        let mut summaries = Vec::with_capacity(bands.len());
        for band in bands {
            let upcoming_events_count = uow.events().count_upcoming_by_band(band.id, now).await?;
            summaries.push(BandWithStanding {
                is_admin: admin_of.get(&band.id).copied().unwrap_or_default(),
                upcoming_events_count,
                band,
            });
        }
        summaries.sort_by(|a, b| {
            (b.band.created_at, b.band.id).cmp(&(a.band.created_at, a.band.id))
        });

        Ok(summaries.into_iter().map(BandSummaryResponse::from).collect())
    }

    /// Band detail with its roster (active members only may look)
    #[instrument(skip(self))]
    pub async fn get_band_page(
        &self,
        band_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<BandPageResponse> {
        let mut uow = self.ctx.begin().await?;

        let caller = PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Participate)
            .await?;

        let band = uow
            .bands()
            .find_by_id(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        let memberships = uow.memberships().find_by_band(band_id).await?;
        let user_ids: Vec<Snowflake> = memberships.iter().map(|m| m.user_id).collect();
        let users: HashMap<_, _> = uow
            .users()
            .find_many(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let members = memberships
            .iter()
            .map(|membership| {
                MemberResponse::from(MemberWithUser {
                    membership,
                    user: users.get(&membership.user_id),
                })
            })
            .collect();

        Ok(BandPageResponse {
            band: BandResponse::from(&band),
            members,
            current_user_id: user_id.to_string(),
            is_admin: caller.is_admin(),
        })
    }

    /// Delete a band and everything below it, leaves first
    ///
    /// Shared by the admin delete and by the last member leaving.
    pub(crate) async fn delete_cascade(
        uow: &mut dyn UnitOfWork,
        band_id: Snowflake,
    ) -> ServiceResult<()> {
        let events = uow.events().find_by_band(band_id).await?;
        for event in &events {
            uow.rsvps().delete_by_event(event.id).await?;
            uow.events().delete(event.id).await?;
        }

        let memberships = uow.memberships().delete_by_band(band_id).await?;
        uow.bands().delete(band_id).await?;

        info!(band_id = %band_id, events = events.len(), memberships, "Band cascade deleted");
        Ok(())
    }
}
