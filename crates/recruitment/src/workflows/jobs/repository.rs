use super::domain::{Job, JobFilter, JobId, JobStatus, NewJob};
use crate::identity::UserId;
use crate::store::RepositoryError;
use crate::workflows::listing::PageRequest;

/// Posting storage.
///
/// `update_job` and `transition_job_status` are conditional writes: the implementation must
/// compare the stored status with the expected one and write in the same atomic step,
/// failing with `RepositoryError::StateMismatch` otherwise. Finalizing twice, or an edit
/// reopening a job finalized in between, is prevented here and nowhere else.
pub trait JobRepository: Send + Sync {
    fn create_job(&self, job: NewJob) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job, expected: JobStatus) -> Result<Job, RepositoryError>;
    fn transition_job_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Job, RepositoryError>;
    fn find_job_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    /// Newest first, with the total number of matches.
    fn find_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, u64), RepositoryError>;
    fn find_jobs_by_recruiter(
        &self,
        recruiter: UserId,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, u64), RepositoryError>;
}
