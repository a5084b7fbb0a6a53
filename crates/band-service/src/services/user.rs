//! User service
//!
//! Keeps application users in step with the identity provider.

use band_common::IdentityClaims;
use band_core::entities::User;
use band_core::traits::UnitOfWork;
use band_core::{DomainError, Snowflake};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::dto::{IdentityWebhookUser, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::membership::MembershipService;

/// Identity fields the provider hands us on login or in a webhook
#[derive(Debug, Clone, Copy)]
pub struct IdentityProfile<'p> {
    pub subject: &'p str,
    pub nickname: Option<&'p str>,
    pub given_name: Option<&'p str>,
    pub family_name: Option<&'p str>,
}

impl<'p> From<&'p IdentityClaims> for IdentityProfile<'p> {
    fn from(claims: &'p IdentityClaims) -> Self {
        Self {
            subject: &claims.sub,
            nickname: claims.nickname.as_deref(),
            given_name: claims.given_name.as_deref(),
            family_name: claims.family_name.as_deref(),
        }
    }
}

impl<'p> From<&'p IdentityWebhookUser> for IdentityProfile<'p> {
    fn from(user: &'p IdentityWebhookUser) -> Self {
        Self {
            subject: &user.id,
            nickname: user.username.as_deref(),
            given_name: user.first_name.as_deref(),
            family_name: user.last_name.as_deref(),
        }
    }
}

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create or refresh the user behind an identity
    ///
    /// Writes nothing when the stored profile already matches. A username
    /// held by someone else is never taken over: a new user gets it with
    /// their id appended, an existing user keeps the one they have.
    #[instrument(skip(self, profile), fields(subject = %profile.subject))]
    pub async fn sync_user(&self, profile: IdentityProfile<'_>) -> ServiceResult<User> {
        let wanted = User::username_from(profile.nickname);

        let mut uow = self.ctx.begin().await?;

        let mut user = match uow.users().find_by_token(profile.subject).await? {
            Some(user) => user,
            None => {
                let id = self.ctx.generate_id();
                let username =
                    Self::claim_username(uow.as_mut(), &wanted, None, || format!("{wanted}_{id}"))
                        .await?;
                let display_name =
                    User::display_name_from(profile.given_name, profile.family_name, &username);
                let user = User::new(id, profile.subject.to_string(), username, display_name);

                if uow.users().create(&user).await? {
                    uow.commit().await?;
                    info!(user_id = %user.id, username = %user.username, "User created");
                    return Ok(user);
                }

                // A concurrent request created this identity first
                uow.users()
                    .find_by_token(profile.subject)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::internal(format!("user for {} vanished", profile.subject))
                    })?
            }
        };

        let username = Self::claim_username(uow.as_mut(), &wanted, Some(user.id), || {
            user.username.clone()
        })
        .await?;
        let display_name =
            User::display_name_from(profile.given_name, profile.family_name, &username);
        if user.matches_profile(&username, &display_name) {
            return Ok(user);
        }

        user.set_profile(username, display_name);
        uow.users().update(&user).await?;
        uow.commit().await?;

        info!(user_id = %user.id, "User profile updated");
        Ok(user)
    }

    /// `wanted` if nobody but `owner` holds it, `fallback()` otherwise
    async fn claim_username(
        uow: &mut dyn UnitOfWork,
        wanted: &str,
        owner: Option<Snowflake>,
        fallback: impl FnOnce() -> String,
    ) -> ServiceResult<String> {
        match uow.users().find_by_username(wanted).await? {
            Some(holder) if Some(holder.id) != owner => {
                let username = fallback();
                warn!(wanted = %wanted, username = %username, "Username taken by another user");
                Ok(username)
            }
            _ => Ok(wanted.to_string()),
        }
    }

    /// Remove the user behind an identity and everything they own
    ///
    /// Every membership goes through the same departure path as leaving a
    /// band, so rosters, admins and counters stay consistent. Returns false
    /// when no such user exists.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, subject: &str) -> ServiceResult<bool> {
        let mut uow = self.ctx.begin().await?;

        let Some(user) = uow.users().find_by_token(subject).await? else {
            return Ok(false);
        };

        let now = Utc::now();
        let mut memberships = uow.memberships().find_by_user(user.id).await?;
        memberships.sort_by_key(|m| m.band_id);
        for membership in &memberships {
            uow.bands()
                .lock(membership.band_id)
                .await?
                .ok_or(DomainError::BandNotFound(membership.band_id))?;
            MembershipService::depart(uow.as_mut(), membership, now).await?;
        }

        // Whatever is left sits on past events or on events of bands the
        // user already left
        for rsvp in uow.rsvps().find_by_user(user.id).await? {
            uow.rsvps().delete(rsvp.id).await?;
            uow.events()
                .adjust_counts(rsvp.event_id, -1, -i32::from(rsvp.status.is_attending()))
                .await?;
        }

        uow.users().delete(user.id).await?;
        uow.commit().await?;

        info!(user_id = %user.id, bands = memberships.len(), "User deleted");
        Ok(true)
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let mut uow = self.ctx.begin().await?;

        let user = uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        Ok(UserResponse::from(&user))
    }
}
