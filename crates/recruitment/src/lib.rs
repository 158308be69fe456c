//! Recruitment platform core.
//!
//! Candidates browse and apply to job postings; recruiters create, edit and finalize them.
//! The lifecycle managers under [`workflows`] own every state transition and run the
//! authorization policy before touching the store.

pub mod config;
pub mod error;
pub mod identity;
pub mod router;
pub mod store;
pub mod telemetry;
pub mod workflows;

pub use error::{AppError, ServiceError};
pub use router::{api_router, ApiState};
pub use store::{MemoryStore, RepositoryError, Store};
