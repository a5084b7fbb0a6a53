//! Identity provider tokens
//!
//! Users never sign in here. The identity provider issues an HS256 JWT and
//! this module only verifies it and exposes the profile claims.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::error::AppError;

/// Verified claims of an identity provider token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable subject identifier
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies identity provider tokens
#[derive(Clone)]
pub struct IdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    /// Create a verifier from the shared secret and optional issuer / audience
    #[must_use]
    pub fn new(secret: &str, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.issuer.as_deref(),
            config.audience.as_deref(),
        )
    }

    /// Decode and validate a bearer token
    ///
    /// # Errors
    /// Returns an error if the token is malformed, badly signed, or expired
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier").finish_non_exhaustive()
    }
}
