//! Bearer token issuing and validation (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::{Role, User, UserId};
use crate::error::ServiceError;

/// Issuer stamped into every token and required on validation.
pub const TOKEN_ISSUER: &str = "recruitment-system";

/// Default expiry window in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest expiry window accepted from configuration.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Decoded identity of the caller, produced once per request by [`TokenIssuer::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
}

impl From<&Claims> for Session {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::try_hours(ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS))
                .unwrap_or_else(|| Duration::hours(DEFAULT_TOKEN_TTL_HOURS)),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ServiceError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| ServiceError::Internal(format!("token signing failed: {err}")))
    }

    pub fn validate(&self, token: &str) -> Result<Session, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::unauthorized("Token expired"),
                _ => ServiceError::unauthorized("Invalid token"),
            }
        })?;

        Ok(Session::from(&data.claims))
    }
}
