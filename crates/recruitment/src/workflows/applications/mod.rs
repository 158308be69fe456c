//! Candidate applications: apply, withdraw, listings, and dashboard counts.

pub mod domain;
pub mod repository;
pub mod service;
pub mod views;

pub use domain::{Application, ApplicationId, ApplicationStatus, NewApplication};
pub use repository::ApplicationRepository;
pub use service::ApplicationLifecycleService;
pub use views::{ApplicationView, CandidateStats};
