//! Role and ownership checks run by the lifecycle managers before any write.

use crate::error::ServiceError;
use crate::identity::{Role, Session, UserId};

pub fn require_role(actor: &Session, role: Role, message: &str) -> Result<(), ServiceError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(ServiceError::forbidden(message))
    }
}

pub fn ensure_owner(actor: &Session, owner: UserId, message: &str) -> Result<(), ServiceError> {
    if actor.user_id == owner {
        Ok(())
    } else {
        Err(ServiceError::forbidden(message))
    }
}
