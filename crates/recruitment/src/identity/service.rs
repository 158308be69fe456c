use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{NewUser, Role, User, UserId};
use super::password::{hash_password, validate_password, verify_password};
use super::repository::UserRepository;
use super::token::{Session, TokenIssuer};
use crate::error::ServiceError;
use crate::store::RepositoryError;

/// Registration payload as received from clients.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutput {
    pub token: String,
}

/// Registration, credential checks and session decoding.
pub struct IdentityService<S> {
    users: Arc<S>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl<S> IdentityService<S>
where
    S: UserRepository + 'static,
{
    pub fn new(users: Arc<S>, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn register(&self, input: RegisterInput) -> Result<RegisteredUser, ServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid_value("name is required"));
        }
        let email = input.email.trim().to_ascii_lowercase();
        if !is_plausible_email(&email) {
            return Err(ServiceError::invalid_value("email must be a valid address"));
        }
        validate_password(&input.password)?;
        let role = Role::parse(&input.role)
            .ok_or_else(|| ServiceError::invalid_value("role must be CANDIDATE or RECRUITER"))?;

        let password_hash = hash_password(&input.password, self.bcrypt_cost)?;
        let user = self
            .users
            .create_user(NewUser {
                name: name.to_string(),
                email,
                password_hash,
                role,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => ServiceError::conflict("email already registered"),
                other => ServiceError::Repository(other),
            })?;

        info!(user_id = %user.id, role = %user.role, "user registered");

        Ok(RegisteredUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }

    /// Returns the stored user when the password matches its hash.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = email.trim().to_ascii_lowercase();
        let user = self
            .users
            .find_user_by_email(&email)?
            .ok_or_else(|| ServiceError::unauthorized("invalid credentials"))?;

        if !verify_password(password, &user.password_hash) {
            return Err(ServiceError::unauthorized("invalid credentials"));
        }

        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutput, ServiceError> {
        let user = self.verify_credentials(email, password)?;
        let token = self.tokens.issue(&user)?;
        Ok(LoginOutput { token })
    }

    pub fn validate_token(&self, token: &str) -> Result<Session, ServiceError> {
        self.tokens.validate(token)
    }
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
