//! Membership service
//!
//! The invite state machine: invited -> member -> admin, with departures
//! (leave, kick, account deletion) keeping the band's roster, admin set
//! and counters consistent.

use std::collections::HashMap;

use band_core::entities::Membership;
use band_core::traits::UnitOfWork;
use band_core::{BandRole, Capability, DomainError, Rsvp, Snowflake};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::dto::{
    InviteRequest, InviteResponse, InviteWithDetails, MemberResponse, MemberWithUser,
    MembershipResponse,
};

use super::band::BandService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// What became of a band after one of its members departed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The membership is gone, the band carries on
    Left,
    /// The departing admin handed the band to `successor`
    Succeeded { successor: Snowflake },
    /// Nobody active was left, so the band was deleted
    BandDeleted,
}

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Invite a user to a band by username
    #[instrument(skip(self, request))]
    pub async fn invite(
        &self,
        band_id: Snowflake,
        inviter_id: Snowflake,
        request: InviteRequest,
    ) -> ServiceResult<MemberResponse> {
        let mut uow = self.ctx.begin().await?;

        PermissionService::new(uow.as_mut())
            .require(band_id, inviter_id, Capability::Manage)
            .await?;

        let invitee = uow
            .users()
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(request.username.clone()))?;

        if uow.memberships().find(band_id, invitee.id).await?.is_some() {
            return Err(DomainError::AlreadyInvitedOrMember.into());
        }

        let membership = Membership::invite(self.ctx.generate_id(), band_id, invitee.id, inviter_id);
        uow.memberships().create(&membership).await?;
        uow.commit().await?;

        info!(band_id = %band_id, user_id = %invitee.id, invited_by = %inviter_id, "Invite sent");

        Ok(MemberResponse::from(MemberWithUser {
            membership: &membership,
            user: Some(&invitee),
        }))
    }

    /// Accept an invite addressed to the caller
    ///
    /// The new member gets a pending RSVP on every upcoming event of the band.
    /// Accepting into a band whose active members have all left makes the
    /// caller its admin.
    #[instrument(skip(self))]
    pub async fn accept(
        &self,
        membership_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<MembershipResponse> {
        let mut uow = self.ctx.begin().await?;

        let band_id = Self::own_invite(uow.as_mut(), membership_id, user_id)
            .await?
            .band_id;
        let band = uow
            .bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        // Re-read under the band lock
        let mut membership = Self::own_invite(uow.as_mut(), membership_id, user_id).await?;
        membership.accept()?;

        let member_count = uow.bands().adjust_member_count(band_id, 1).await?;
        // Nobody else is active, so nobody else is admin
        if member_count == 1 {
            membership.promote()?;
        }
        uow.memberships().set_role(membership.id, membership.role).await?;

        let now = Utc::now();
        let mut backfilled = 0;
        for event in uow.events().find_upcoming_by_band(band_id, now).await? {
            if uow.rsvps().find(user_id, event.id).await?.is_some() {
                continue;
            }
            let rsvp = Rsvp::pending(self.ctx.generate_id(), user_id, event.id, event.start_time);
            uow.rsvps().create(&rsvp).await?;
            uow.events().adjust_counts(event.id, 1, 0).await?;
            backfilled += 1;
        }

        uow.commit().await?;

        info!(
            band_id = %band_id,
            user_id = %user_id,
            member_count,
            backfilled,
            role = ?membership.role,
            "Invite accepted"
        );

        Ok(MembershipResponse::from((&membership, &band)))
    }

    /// Decline an invite addressed to the caller
    ///
    /// Declining the last invite of a band nobody is active in deletes it.
    #[instrument(skip(self))]
    pub async fn decline(&self, membership_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut uow = self.ctx.begin().await?;

        let band_id = Self::own_invite(uow.as_mut(), membership_id, user_id)
            .await?
            .band_id;
        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        let membership = Self::own_invite(uow.as_mut(), membership_id, user_id).await?;
        if membership.role != BandRole::Invited {
            return Err(DomainError::InvalidTarget("Invite was already accepted".to_string()).into());
        }

        let departure = Self::depart(uow.as_mut(), &membership, Utc::now()).await?;
        uow.commit().await?;

        info!(band_id = %band_id, user_id = %user_id, ?departure, "Invite declined");
        Ok(())
    }

    /// Promote a member to admin
    ///
    /// Promoting an admin changes nothing.
    #[instrument(skip(self))]
    pub async fn promote(
        &self,
        membership_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<MemberResponse> {
        let mut uow = self.ctx.begin().await?;

        let band_id = uow
            .memberships()
            .find_by_id(membership_id)
            .await?
            .ok_or(DomainError::MembershipNotFound)?
            .band_id;
        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        PermissionService::new(uow.as_mut())
            .require(band_id, actor_id, Capability::Manage)
            .await?;

        let mut membership = uow
            .memberships()
            .find_by_id(membership_id)
            .await?
            .ok_or(DomainError::MembershipNotFound)?;

        let user = uow.users().find_by_id(membership.user_id).await?;

        if membership.promote()? {
            uow.memberships().set_role(membership.id, membership.role).await?;
            uow.commit().await?;
            info!(band_id = %band_id, user_id = %membership.user_id, promoted_by = %actor_id, "Member promoted");
        }

        Ok(MemberResponse::from(MemberWithUser {
            membership: &membership,
            user: user.as_ref(),
        }))
    }

    /// Leave a band
    #[instrument(skip(self))]
    pub async fn leave(&self, band_id: Snowflake, user_id: Snowflake) -> ServiceResult<Departure> {
        let mut uow = self.ctx.begin().await?;

        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        let membership = PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Participate)
            .await?;

        let departure = Self::depart(uow.as_mut(), &membership, Utc::now()).await?;
        uow.commit().await?;

        info!(band_id = %band_id, user_id = %user_id, ?departure, "Member left");
        Ok(departure)
    }

    /// Remove a plain member from a band
    #[instrument(skip(self))]
    pub async fn kick(
        &self,
        band_id: Snowflake,
        target_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<Departure> {
        let mut uow = self.ctx.begin().await?;

        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        PermissionService::new(uow.as_mut())
            .require(band_id, actor_id, Capability::Manage)
            .await?;

        let target = uow
            .memberships()
            .find(band_id, target_id)
            .await?
            .ok_or(DomainError::MembershipNotFound)?;
        target.ensure_kickable()?;

        let departure = Self::depart(uow.as_mut(), &target, Utc::now()).await?;
        uow.commit().await?;

        info!(band_id = %band_id, user_id = %target_id, kicked_by = %actor_id, "Member kicked");
        Ok(departure)
    }

    /// Pending invites addressed to the caller, newest first
    #[instrument(skip(self))]
    pub async fn list_pending_invites(&self, user_id: Snowflake) -> ServiceResult<Vec<InviteResponse>> {
        let mut uow = self.ctx.begin().await?;

        let invites: Vec<Membership> = uow
            .memberships()
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(|m| m.role == BandRole::Invited)
            .collect();

        let band_ids: Vec<Snowflake> = invites.iter().map(|m| m.band_id).collect();
        let bands: HashMap<_, _> = uow
            .bands()
            .find_many(&band_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let inviter_ids: Vec<Snowflake> = invites.iter().filter_map(|m| m.invited_by).collect();
        let inviters: HashMap<_, _> = uow
            .users()
            .find_many(&inviter_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(invites
            .iter()
            .filter_map(|membership| {
                let band = bands.get(&membership.band_id)?;
                Some(InviteResponse::from(InviteWithDetails {
                    membership,
                    band,
                    inviter: membership.invited_by.and_then(|id| inviters.get(&id)),
                }))
            })
            .collect())
    }

    /// The caller's member and admin memberships
    #[instrument(skip(self))]
    pub async fn list_active_memberships(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<MembershipResponse>> {
        let mut uow = self.ctx.begin().await?;

        let memberships: Vec<Membership> = uow
            .memberships()
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(Membership::is_active)
            .collect();

        let band_ids: Vec<Snowflake> = memberships.iter().map(|m| m.band_id).collect();
        let bands: HashMap<_, _> = uow
            .bands()
            .find_many(&band_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        Ok(memberships
            .iter()
            .filter_map(|m| bands.get(&m.band_id).map(|b| MembershipResponse::from((m, b))))
            .collect())
    }

    // ========================================================================
    // Shared transitions
    // ========================================================================

    /// Remove a membership and repair the band around the gap
    ///
    /// Expects the band row to be locked by the caller. An invite is simply
    /// deleted. An active member loses their RSVPs on upcoming events of the
    /// band; if they were the last admin the most senior remaining member
    /// is promoted. The band is deleted once it holds no membership of any
    /// role; pending invites alone keep it alive without an admin.
    pub(crate) async fn depart(
        uow: &mut dyn UnitOfWork,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> ServiceResult<Departure> {
        let band_id = membership.band_id;

        if !membership.is_active() {
            uow.memberships().delete(membership.id).await?;
            return Self::settle_empty_band(uow, band_id).await;
        }

        let rsvps = uow
            .rsvps()
            .find_upcoming_by_user_in_band(membership.user_id, band_id, now)
            .await?;
        for rsvp in &rsvps {
            uow.rsvps().delete(rsvp.id).await?;
            uow.events()
                .adjust_counts(rsvp.event_id, -1, -i32::from(rsvp.status.is_attending()))
                .await?;
        }

        uow.memberships().delete(membership.id).await?;
        let member_count = uow.bands().adjust_member_count(band_id, -1).await?;

        if member_count == 0 {
            return Self::settle_empty_band(uow, band_id).await;
        }

        if !membership.is_admin() {
            return Ok(Departure::Left);
        }

        let remaining = uow.memberships().find_by_band(band_id).await?;
        if remaining.iter().any(Membership::is_admin) {
            return Ok(Departure::Left);
        }

        let successor = remaining
            .iter()
            .filter(|m| m.is_active())
            .min_by_key(|m| m.seniority())
            .ok_or_else(|| {
                ServiceError::internal(format!("band {band_id} has members but none active"))
            })?;
        uow.memberships().set_role(successor.id, BandRole::Admin).await?;

        info!(band_id = %band_id, user_id = %successor.user_id, "Admin succession");
        Ok(Departure::Succeeded {
            successor: successor.user_id,
        })
    }

    /// Delete a band with no active members once its last invite is gone too
    ///
    /// Expects the band row to be locked by the caller.
    async fn settle_empty_band(
        uow: &mut dyn UnitOfWork,
        band_id: Snowflake,
    ) -> ServiceResult<Departure> {
        let band = uow
            .bands()
            .find_by_id(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;
        if band.member_count > 0 {
            return Ok(Departure::Left);
        }

        let pending = uow.memberships().find_by_band(band_id).await?;
        if !pending.is_empty() {
            info!(band_id = %band_id, invites = pending.len(), "Band kept for pending invites");
            return Ok(Departure::Left);
        }

        BandService::delete_cascade(uow, band_id).await?;
        Ok(Departure::BandDeleted)
    }

    /// Load a membership and check it belongs to `user_id`
    async fn own_invite(
        uow: &mut dyn UnitOfWork,
        membership_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Membership> {
        let membership = uow
            .memberships()
            .find_by_id(membership_id)
            .await?
            .ok_or(DomainError::MembershipNotFound)?;

        if !membership.belongs_to(user_id) {
            return Err(DomainError::NotYours.into());
        }
        Ok(membership)
    }
}
