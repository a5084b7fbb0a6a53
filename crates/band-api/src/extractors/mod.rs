//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and pagination.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::CurrentUser;
pub use pagination::{Pagination, PaginationParams};
pub use path::{BandIdPath, BandUserPath, EventIdPath, MembershipIdPath};
pub use validated::{JsonBody, ValidatedJson};
