//! Password hashing and policy checks.

use crate::error::ServiceError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// bcrypt only reads the first 72 bytes; longer secrets would silently collide.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::invalid_value(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ServiceError::invalid_value(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Hash with bcrypt. CPU bound; async callers should run it on a blocking thread.
pub fn hash_password(password: &str, cost: u32) -> Result<String, ServiceError> {
    bcrypt::hash(password, cost)
        .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")))
}

/// Compare a candidate password with a stored hash. A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
