//! Route handlers
//!
//! All HTTP request handlers organized by resource.

pub mod bands;
pub mod events;
pub mod health;
pub mod invites;
pub mod memberships;
pub mod users;
pub mod webhooks;
