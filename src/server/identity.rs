//! Identity extraction.
//!
//! Authentication happens upstream (the deployment fronts the service with
//! an authenticating proxy); the verified user identifier arrives in a
//! request header. Listing works with or without an identity; mutations
//! require one.

use axum::extract::FromRequestParts;
use http::request::Parts;

use super::handlers::ApiError;

/// Header carrying the verified user identifier.
pub const IDENTITY_HEADER: &str = "x-user-id";

fn identity_from_parts(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extractor for endpoints that work with or without an identity.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalIdentity(identity_from_parts(parts)))
    }
}

/// Extractor for endpoints that require an identity; rejects with 401.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts)
            .map(Identity)
            .ok_or(ApiError::Unauthorized)
    }
}
