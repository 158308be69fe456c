use super::domain::{Application, ApplicationId, ApplicationStatus, NewApplication};
use crate::identity::UserId;
use crate::store::RepositoryError;
use crate::workflows::jobs::JobId;
use crate::workflows::listing::PageRequest;

/// Application storage.
///
/// At most one application may exist per (job, candidate) pair. `create_application` must
/// enforce this itself and answer `RepositoryError::Conflict`; the service-level existence
/// check only produces the friendlier message.
pub trait ApplicationRepository: Send + Sync {
    fn create_application(&self, application: NewApplication)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn find_application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn application_exists(&self, job: JobId, candidate: UserId) -> Result<bool, RepositoryError>;
    fn find_applications_by_job(&self, job: JobId) -> Result<Vec<Application>, RepositoryError>;
    /// Newest first, optionally narrowed to one status.
    fn find_application_page_by_job(
        &self,
        job: JobId,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Application>, u64), RepositoryError>;
    /// Newest first.
    fn find_applications_by_candidate(
        &self,
        candidate: UserId,
        page: PageRequest,
    ) -> Result<(Vec<Application>, u64), RepositoryError>;
    fn count_applications_by_candidate(&self, candidate: UserId) -> Result<u64, RepositoryError>;
    fn count_pending_by_candidate(&self, candidate: UserId) -> Result<u64, RepositoryError>;
}
