//! Domain entities - core business objects

mod band;
mod event;
mod membership;
mod rsvp;
mod user;

pub use band::Band;
pub use event::{Event, EventPatch};
pub use membership::Membership;
pub use rsvp::Rsvp;
pub use user::User;
