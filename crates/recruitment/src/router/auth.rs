use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::ApiState;
use crate::error::ServiceError;
use crate::identity::Session;
use crate::store::Store;

/// Decodes the bearer token once per request into the caller's [`Session`].
#[axum::async_trait]
impl<S> FromRequestParts<ApiState<S>> for Session
where
    S: Store,
{
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState<S>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::unauthorized("Authorization header is required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ServiceError::unauthorized("Bearer token required"))?;

        state.identity.validate_token(token)
    }
}
