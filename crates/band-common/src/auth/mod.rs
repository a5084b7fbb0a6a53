//! Identity provider token verification

mod identity;

pub use identity::{IdentityClaims, IdentityVerifier};
