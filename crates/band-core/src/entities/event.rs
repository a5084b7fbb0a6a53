//! Event entity - a scheduled band event with cached RSVP aggregates

use chrono::{DateTime, Utc};

use crate::value_objects::{EventCursor, EventType, Snowflake};

/// Event entity
///
/// `rsvp_count` caches the number of RSVP rows for the event and
/// `attending_count` the number of those with status "yes";
/// `0 <= attending_count <= rsvp_count` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Snowflake,
    pub band_id: Snowflake,
    pub name: Option<String>,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub rsvp_count: i32,
    pub attending_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new Event with zeroed aggregates
    pub fn new(
        id: Snowflake,
        band_id: Snowflake,
        event_type: EventType,
        start_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            band_id,
            name: None,
            event_type,
            start_time,
            location: None,
            description: None,
            rsvp_count: 0,
            attending_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Upcoming events start at or after `now`
    #[inline]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time >= now
    }

    /// Keyset position of this event in start-time order
    pub fn cursor(&self) -> EventCursor {
        EventCursor::new(self.start_time, self.id)
    }

    /// Apply a partial update. Returns true when the start time changed.
    pub fn apply(&mut self, patch: EventPatch) -> bool {
        fn blank_to_none(value: String) -> Option<String> {
            if value.trim().is_empty() {
                None
            } else {
                Some(value)
            }
        }

        if let Some(name) = patch.name {
            self.name = blank_to_none(name);
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(location) = patch.location {
            self.location = blank_to_none(location);
        }
        if let Some(description) = patch.description {
            self.description = blank_to_none(description);
        }

        let rescheduled = match patch.start_time {
            Some(start_time) if start_time != self.start_time => {
                self.start_time = start_time;
                true
            }
            _ => false,
        };

        self.updated_at = Utc::now();
        rescheduled
    }
}

/// Partial update of an event
///
/// `None` leaves a field untouched; an empty string clears an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub event_type: Option<EventType>,
    pub start_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
