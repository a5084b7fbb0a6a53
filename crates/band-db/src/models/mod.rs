//! Database models - SQLx-compatible structs for PostgreSQL tables

mod band;
mod event;
mod membership;
mod rsvp;
mod user;

pub use band::BandModel;
pub use event::EventModel;
pub use membership::MembershipModel;
pub use rsvp::RsvpModel;
pub use user::UserModel;
