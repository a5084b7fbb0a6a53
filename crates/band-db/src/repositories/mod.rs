//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in band-core.
//! Every repository runs on the transaction owned by [`PgUnitOfWork`].

mod band;
mod error;
mod event;
mod membership;
mod rsvp;
mod unit_of_work;
mod user;

pub use unit_of_work::{PgDatabase, PgUnitOfWork};
