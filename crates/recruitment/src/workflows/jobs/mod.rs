//! Job postings: creation, edits, finalize, and public reads.

pub mod domain;
pub mod repository;
pub mod service;
pub mod views;

pub use domain::{FinalizeMode, Job, JobDraft, JobFilter, JobId, JobPatch, JobStatus, NewJob};
pub use repository::JobRepository;
pub use service::JobLifecycleService;
pub use views::{FinalizeOutcome, JobView};
