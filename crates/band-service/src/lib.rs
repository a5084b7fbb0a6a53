//! # band-service
//!
//! Application layer: user directory, band registry, membership state
//! machine, event and RSVP ledger, plus the DTOs they speak.
//!
//! Every mutating operation opens one unit of work, performs all checks
//! before its first write, and commits at the end.

pub mod dto;
pub mod services;

pub use services::{
    BandService, Departure, EventService, IdentityProfile, MembershipService, PermissionService,
    RsvpService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
