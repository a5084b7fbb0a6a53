//! Value objects - immutable types that represent domain concepts

mod cursor;
mod event_kind;
mod role;
mod snowflake;

pub use cursor::EventCursor;
pub use event_kind::{EventType, RsvpStatus};
pub use role::{BandRole, Capability};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
