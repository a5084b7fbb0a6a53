//! RSVP service

use band_core::entities::Rsvp;
use band_core::{Capability, DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{RsvpResponse, SetRsvpRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::event::EventService;
use super::permission::PermissionService;

/// RSVP service
pub struct RsvpService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RsvpService<'a> {
    /// Create a new RsvpService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Set the caller's response to an event
    ///
    /// An existing RSVP is updated in place and `attending_count` moves by the
    /// change in "yes". Without one, the caller must be an active member and
    /// a new RSVP is counted in.
    #[instrument(skip(self, request))]
    pub async fn set_status(
        &self,
        event_id: Snowflake,
        user_id: Snowflake,
        request: SetRsvpRequest,
    ) -> ServiceResult<RsvpResponse> {
        let mut uow = self.ctx.begin().await?;

        let band_id = EventService::find_event(uow.as_mut(), event_id).await?.band_id;
        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;
        let event = uow
            .events()
            .lock(event_id)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?;

        let (rsvp, previous) = match uow.rsvps().find(user_id, event_id).await? {
            Some(mut rsvp) => {
                let previous = rsvp.status;
                let delta = rsvp.set_status(request.status);
                if previous != request.status {
                    uow.rsvps().set_status(rsvp.id, rsvp.status).await?;
                }
                if delta != 0 {
                    uow.events().adjust_counts(event_id, 0, delta).await?;
                }
                (rsvp, Some(previous))
            }
            None => {
                PermissionService::new(uow.as_mut())
                    .require(band_id, user_id, Capability::Participate)
                    .await?;

                let rsvp = Rsvp::new(
                    self.ctx.generate_id(),
                    user_id,
                    event_id,
                    request.status,
                    event.start_time,
                );
                uow.rsvps().create(&rsvp).await?;
                uow.events()
                    .adjust_counts(event_id, 1, i32::from(rsvp.status.is_attending()))
                    .await?;
                (rsvp, None)
            }
        };
        uow.commit().await?;

        info!(
            event_id = %event_id,
            user_id = %user_id,
            from = previous.map_or("none", |s| s.as_str()),
            to = %rsvp.status,
            "RSVP changed"
        );
        Ok(RsvpResponse::from(&rsvp))
    }
}
