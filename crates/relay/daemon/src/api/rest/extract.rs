//! Request extractors

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use relay_types::Principal;

use crate::error::ApiError;

/// Header carrying the caller's identity, set by the fronting proxy.
pub const PRINCIPAL_HEADER: &str = "x-relay-principal";

/// The principal a request is made on behalf of.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("missing {} header", PRINCIPAL_HEADER)))?;
        let text = value
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{} is not text", PRINCIPAL_HEADER)))?;
        let principal = text
            .parse::<Principal>()
            .map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", PRINCIPAL_HEADER, e)))?;
        Ok(Caller(principal))
    }
}
