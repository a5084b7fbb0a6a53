//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and runs every
//! operation inside one unit of work.

pub mod band;
pub mod context;
pub mod error;
pub mod event;
pub mod membership;
pub mod permission;
pub mod rsvp;
pub mod user;

// Re-export all services for convenience
pub use band::BandService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use event::EventService;
pub use membership::{Departure, MembershipService};
pub use permission::PermissionService;
pub use rsvp::RsvpService;
pub use user::{IdentityProfile, UserService};
