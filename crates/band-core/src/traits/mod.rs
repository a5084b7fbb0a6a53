//! Ports implemented by the storage layer

mod repositories;

pub use repositories::{
    BandRepository, Database, EventRepository, MembershipRepository, Page, RepoResult,
    RsvpRepository, UnitOfWork, UserRepository,
};
