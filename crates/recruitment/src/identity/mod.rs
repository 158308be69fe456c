//! Users, credentials and bearer sessions.

pub mod domain;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use domain::{NewUser, Role, User, UserId};
pub use repository::UserRepository;
pub use service::{IdentityService, LoginOutput, RegisterInput, RegisteredUser};
pub use token::{Claims, Session, TokenIssuer};
