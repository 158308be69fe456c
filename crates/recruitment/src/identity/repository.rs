use super::domain::{NewUser, User, UserId};
use crate::store::RepositoryError;

/// Account storage. Email uniqueness is part of the contract: a second
/// `create_user` with an existing email must fail with `RepositoryError::Conflict`.
pub trait UserRepository: Send + Sync {
    fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}
