//! Keyset cursor for paging through events ordered by start time

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Position after the last event of a page: `(start_time, event_id)`
///
/// Rendered as `"<startTimeMillis>:<eventId>"` so clients can treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCursor {
    pub start_time: DateTime<Utc>,
    pub event_id: Snowflake,
}

impl EventCursor {
    pub fn new(start_time: DateTime<Utc>, event_id: Snowflake) -> Self {
        Self {
            start_time,
            event_id,
        }
    }
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_time.timestamp_millis(), self.event_id)
    }
}

impl FromStr for EventCursor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::ValidationError(format!("invalid cursor: {s}"));

        let (millis, id) = s.split_once(':').ok_or_else(invalid)?;
        let millis = millis.parse::<i64>().map_err(|_| invalid())?;
        let start_time = Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid)?;
        let event_id = Snowflake::parse(id).map_err(|_| invalid())?;

        Ok(Self::new(start_time, event_id))
    }
}
