//! Event type and RSVP status enumerations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Kind of scheduled band event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Rehearsal,
    Gig,
    Meeting,
    Recording,
    Other,
}

impl EventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rehearsal => "rehearsal",
            Self::Gig => "gig",
            Self::Meeting => "meeting",
            Self::Recording => "recording",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rehearsal" => Ok(Self::Rehearsal),
            "gig" => Ok(Self::Gig),
            "meeting" => Ok(Self::Meeting),
            "recording" => Ok(Self::Recording),
            "other" => Ok(Self::Other),
            other => Err(DomainError::ValidationError(format!("unknown event type: {other}"))),
        }
    }
}

/// Attendance response of one user to one event
///
/// Any status may move to any other; the only automatic move is the reset
/// to `Pending` when an event is rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
    #[default]
    Pending,
}

impl RsvpStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
            Self::Pending => "pending",
        }
    }

    /// Only "yes" counts towards an event's attending total
    #[inline]
    pub const fn is_attending(&self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Change in attending count when moving from `self` to `next`
    pub fn attending_delta(self, next: RsvpStatus) -> i32 {
        i32::from(next.is_attending()) - i32::from(self.is_attending())
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "maybe" => Ok(Self::Maybe),
            "pending" => Ok(Self::Pending),
            other => Err(DomainError::ValidationError(format!("unknown rsvp status: {other}"))),
        }
    }
}
