//! # band-core
//!
//! Domain layer containing entities, value objects, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Band, Event, EventPatch, Membership, Rsvp, User};
pub use error::DomainError;
pub use traits::{
    BandRepository, Database, EventRepository, MembershipRepository, Page, RepoResult,
    RsvpRepository, UnitOfWork, UserRepository,
};
pub use value_objects::{
    BandRole, Capability, EventCursor, EventType, RsvpStatus, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};
