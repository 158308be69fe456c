//! Job and application lifecycles plus the shared listing and authorization contracts.

pub mod applications;
pub mod jobs;
pub mod listing;
pub mod policy;

#[cfg(test)]
mod tests;

pub use applications::ApplicationLifecycleService;
pub use jobs::JobLifecycleService;
pub use listing::{PageMeta, PageRequest, Paginated};
