//! Event service
//!
//! Scheduling events and the event read paths. Event writes keep
//! `rsvp_count` and `attending_count` in step with the RSVP rows inside the
//! same unit of work.

use std::collections::HashMap;

use band_core::entities::{Band, Event, Membership, Rsvp};
use band_core::traits::UnitOfWork;
use band_core::{Capability, DomainError, EventCursor, EventPatch, Page, RsvpStatus, Snowflake};
use chrono::Utc;
use tracing::{info, instrument};

use crate::dto::{
    AttendeeResponse, CreateEventRequest, EventCard, EventCardResponse, EventPageResponse,
    EventResponse, UpdateEventRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Event service
pub struct EventService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventService<'a> {
    /// Create a new EventService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Schedule an event (admin only)
    ///
    /// An upcoming event starts with one pending RSVP per active member.
    #[instrument(skip(self, request))]
    pub async fn create_event(
        &self,
        band_id: Snowflake,
        user_id: Snowflake,
        request: CreateEventRequest,
    ) -> ServiceResult<EventResponse> {
        let mut uow = self.ctx.begin().await?;

        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Manage)
            .await?;

        let mut event = Event::new(
            self.ctx.generate_id(),
            band_id,
            request.event_type,
            request.start_time,
        );
        event.apply(request.details());

        let members: Vec<Membership> = if event.is_upcoming(Utc::now()) {
            uow.memberships()
                .find_by_band(band_id)
                .await?
                .into_iter()
                .filter(Membership::is_active)
                .collect()
        } else {
            Vec::new()
        };
        event.rsvp_count = members.len() as i32;

        uow.events().create(&event).await?;
        for member in &members {
            let rsvp = Rsvp::pending(self.ctx.generate_id(), member.user_id, event.id, event.start_time);
            uow.rsvps().create(&rsvp).await?;
        }
        uow.commit().await?;

        info!(
            band_id = %band_id,
            event_id = %event.id,
            rsvps = event.rsvp_count,
            "Event created"
        );
        Ok(EventResponse::from(&event))
    }

    /// Edit an event (admin only)
    ///
    /// Moving an event to a new upcoming start time sends every RSVP back
    /// to pending.
    #[instrument(skip(self, request))]
    pub async fn update_event(
        &self,
        event_id: Snowflake,
        user_id: Snowflake,
        request: UpdateEventRequest,
    ) -> ServiceResult<EventResponse> {
        let mut uow = self.ctx.begin().await?;

        let band_id = Self::find_event(uow.as_mut(), event_id).await?.band_id;
        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Manage)
            .await?;

        let mut event = uow
            .events()
            .lock(event_id)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?;

        let patch = EventPatch::from(request);
        if patch.is_empty() {
            return Ok(EventResponse::from(&event));
        }

        let rescheduled = event.apply(patch);
        uow.events().update(&event).await?;

        let mut reset = 0;
        if rescheduled {
            uow.rsvps().set_start_time(event_id, event.start_time).await?;
            if event.is_upcoming(Utc::now()) {
                reset = uow.rsvps().reset_event(event_id).await?;
                uow.events().reset_attending(event_id).await?;
                event.attending_count = 0;
            }
        }
        uow.commit().await?;

        if rescheduled {
            info!(event_id = %event_id, start_time = %event.start_time, reset, "Event rescheduled");
        } else {
            info!(event_id = %event_id, "Event updated");
        }
        Ok(EventResponse::from(&event))
    }

    /// Delete an event and its RSVPs (admin only)
    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut uow = self.ctx.begin().await?;

        let band_id = Self::find_event(uow.as_mut(), event_id).await?.band_id;
        uow.bands()
            .lock(band_id)
            .await?
            .ok_or(DomainError::BandNotFound(band_id))?;

        PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Manage)
            .await?;

        let rsvps = uow.rsvps().delete_by_event(event_id).await?;
        uow.events().delete(event_id).await?;
        uow.commit().await?;

        info!(band_id = %band_id, event_id = %event_id, rsvps, "Event deleted");
        Ok(())
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    /// Upcoming events the caller holds an RSVP for, soonest first
    #[instrument(skip(self))]
    pub async fn list_upcoming_events_for_user(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<EventCardResponse>> {
        let mut uow = self.ctx.begin().await?;

        let rsvps = uow.rsvps().find_upcoming_by_user(user_id, Utc::now()).await?;
        Self::cards_for_rsvps(uow.as_mut(), user_id, &rsvps).await
    }

    /// Past events the caller held an RSVP for, latest first
    #[instrument(skip(self))]
    pub async fn list_past_events_for_user(
        &self,
        user_id: Snowflake,
        page: Page,
    ) -> ServiceResult<EventPageResponse> {
        let mut uow = self.ctx.begin().await?;

        let mut rsvps = uow
            .rsvps()
            .find_past_by_user(user_id, Utc::now(), page.with_lookahead())
            .await?;
        let has_more = rsvps.len() > page.limit as usize;
        rsvps.truncate(page.limit as usize);

        let next_cursor = if has_more {
            rsvps
                .last()
                .map(|r| EventCursor::new(r.start_time, r.event_id).to_string())
        } else {
            None
        };
        let events = Self::cards_for_rsvps(uow.as_mut(), user_id, &rsvps).await?;

        Ok(EventPageResponse {
            events,
            next_cursor,
            has_more,
        })
    }

    /// Upcoming events of a band, soonest first
    #[instrument(skip(self))]
    pub async fn list_upcoming_events_for_band(
        &self,
        band_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<EventCardResponse>> {
        let mut uow = self.ctx.begin().await?;
        let now = Utc::now();

        let caller = PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Participate)
            .await?;
        let band = Self::find_band(uow.as_mut(), band_id).await?;

        let events = uow.events().find_upcoming_by_band(band_id, now).await?;
        let statuses: HashMap<Snowflake, RsvpStatus> = uow
            .rsvps()
            .find_upcoming_by_user_in_band(user_id, band_id, now)
            .await?
            .into_iter()
            .map(|r| (r.event_id, r.status))
            .collect();

        Ok(events
            .iter()
            .map(|event| {
                EventCardResponse::from(EventCard {
                    event,
                    band_name: &band.name,
                    my_status: statuses.get(&event.id).copied(),
                    is_admin: caller.is_admin(),
                })
            })
            .collect())
    }

    /// Past events of a band, latest first
    #[instrument(skip(self))]
    pub async fn list_past_events_for_band(
        &self,
        band_id: Snowflake,
        user_id: Snowflake,
        page: Page,
    ) -> ServiceResult<EventPageResponse> {
        let mut uow = self.ctx.begin().await?;

        let caller = PermissionService::new(uow.as_mut())
            .require(band_id, user_id, Capability::Participate)
            .await?;
        let band = Self::find_band(uow.as_mut(), band_id).await?;

        let mut events = uow
            .events()
            .find_past_by_band(band_id, Utc::now(), page.with_lookahead())
            .await?;
        let has_more = events.len() > page.limit as usize;
        events.truncate(page.limit as usize);

        let mut cards = Vec::with_capacity(events.len());
        for event in &events {
            let my_status = uow.rsvps().find(user_id, event.id).await?.map(|r| r.status);
            cards.push(EventCardResponse::from(EventCard {
                event,
                band_name: &band.name,
                my_status,
                is_admin: caller.is_admin(),
            }));
        }

        let next_cursor = if has_more {
            events.last().map(|e| e.cursor().to_string())
        } else {
            None
        };

        Ok(EventPageResponse {
            events: cards,
            next_cursor,
            has_more,
        })
    }

    /// Every RSVP of an event with the responder's name
    #[instrument(skip(self))]
    pub async fn get_event_attendees(
        &self,
        event_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<AttendeeResponse>> {
        let mut uow = self.ctx.begin().await?;

        let event = Self::find_event(uow.as_mut(), event_id).await?;
        PermissionService::new(uow.as_mut())
            .require(event.band_id, user_id, Capability::Participate)
            .await?;

        let rsvps = uow.rsvps().find_by_event(event_id).await?;
        let user_ids: Vec<Snowflake> = rsvps.iter().map(|r| r.user_id).collect();
        let users: HashMap<_, _> = uow
            .users()
            .find_many(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rsvps
            .iter()
            .map(|rsvp| AttendeeResponse::from((rsvp, users.get(&rsvp.user_id))))
            .collect())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(crate) async fn find_event(
        uow: &mut dyn UnitOfWork,
        event_id: Snowflake,
    ) -> ServiceResult<Event> {
        uow.events()
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::EventNotFound(event_id).into())
    }

    async fn find_band(uow: &mut dyn UnitOfWork, band_id: Snowflake) -> ServiceResult<Band> {
        uow.bands()
            .find_by_id(band_id)
            .await?
            .ok_or_else(|| DomainError::BandNotFound(band_id).into())
    }

    /// Turn the caller's RSVPs into event cards, keeping their order
    async fn cards_for_rsvps(
        uow: &mut dyn UnitOfWork,
        user_id: Snowflake,
        rsvps: &[Rsvp],
    ) -> ServiceResult<Vec<EventCardResponse>> {
        let event_ids: Vec<Snowflake> = rsvps.iter().map(|r| r.event_id).collect();
        let events: HashMap<_, _> = uow
            .events()
            .find_many(&event_ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let band_ids: Vec<Snowflake> = events.values().map(|e| e.band_id).collect();
        let bands: HashMap<_, _> = uow
            .bands()
            .find_many(&band_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let admin_of: HashMap<Snowflake, bool> = uow
            .memberships()
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|m| (m.band_id, m.is_admin()))
            .collect();

        Ok(rsvps
            .iter()
            .filter_map(|rsvp| {
                let event = events.get(&rsvp.event_id)?;
                let band = bands.get(&event.band_id)?;
                Some(EventCardResponse::from(EventCard {
                    event,
                    band_name: &band.name,
                    my_status: Some(rsvp.status),
                    is_admin: admin_of.get(&band.id).copied().unwrap_or_default(),
                }))
            })
            .collect())
    }
}
