//! Persistence contract and the in-memory implementation used by the service.

mod memory;

pub use memory::MemoryStore;

use crate::identity::UserRepository;
use crate::workflows::applications::ApplicationRepository;
use crate::workflows::jobs::JobRepository;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored status is {actual}, expected {expected}")]
    StateMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Everything the lifecycle managers need from one backing store.
pub trait Store: UserRepository + JobRepository + ApplicationRepository + 'static {}

impl<T> Store for T where T: UserRepository + JobRepository + ApplicationRepository + 'static {}
