use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::domain::{Application, ApplicationId, ApplicationStatus, NewApplication};
use super::views::{ApplicationView, CandidateStats};
use crate::error::ServiceError;
use crate::identity::{Role, Session, UserId};
use crate::store::{RepositoryError, Store};
use crate::workflows::jobs::{Job, JobId, JobStatus};
use crate::workflows::listing::{PageRequest, Paginated};
use crate::workflows::policy::{ensure_owner, require_role};

/// Candidate-facing side of the hiring pipeline plus the recruiter's view of applicants.
pub struct ApplicationLifecycleService<S> {
    store: Arc<S>,
}

impl<S> ApplicationLifecycleService<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn apply(&self, actor: &Session, job_id: JobId) -> Result<ApplicationView, ServiceError> {
        require_role(actor, Role::Candidate, "Only candidates can apply")?;
        let job = self.load_job(job_id)?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::invalid_state(
                "applications are only allowed for OPEN jobs",
            ));
        }
        if self.store.application_exists(job_id, actor.user_id)? {
            return Err(ServiceError::conflict("already applied to this job"));
        }

        let application = self
            .store
            .create_application(NewApplication {
                job_id,
                candidate_id: actor.user_id,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => ServiceError::conflict("already applied to this job"),
                other => ServiceError::Repository(other),
            })?;

        info!(
            application_id = %application.id,
            job_id = %job_id,
            candidate_id = %actor.user_id,
            "application submitted"
        );
        Ok(ApplicationView::for_candidate(&application, Some(&job)))
    }

    pub fn list_for_candidate(
        &self,
        actor: &Session,
        page: PageRequest,
    ) -> Result<Paginated<ApplicationView>, ServiceError> {
        require_role(
            actor,
            Role::Candidate,
            "Only candidates can list their applications",
        )?;
        let (applications, total) = self
            .store
            .find_applications_by_candidate(actor.user_id, page)?;

        let mut jobs: BTreeMap<JobId, Option<Job>> = BTreeMap::new();
        let mut data = Vec::with_capacity(applications.len());
        for application in &applications {
            if !jobs.contains_key(&application.job_id) {
                let job = self.store.find_job_by_id(application.job_id)?;
                jobs.insert(application.job_id, job);
            }
            let job = jobs.get(&application.job_id).and_then(Option::as_ref);
            data.push(ApplicationView::for_candidate(application, job));
        }

        Ok(Paginated::new(data, total, page))
    }

    /// Applicants of one job, visible only to the recruiter who owns it.
    pub fn list_for_job(
        &self,
        actor: &Session,
        job_id: JobId,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<Paginated<ApplicationView>, ServiceError> {
        require_role(
            actor,
            Role::Recruiter,
            "Only recruiters can view job applications",
        )?;
        let job = self.load_job(job_id)?;
        ensure_owner(
            actor,
            job.recruiter_id,
            "unauthorized: job does not belong to recruiter",
        )?;

        let (applications, total) = self
            .store
            .find_application_page_by_job(job_id, status, page)?;
        let mut data = Vec::with_capacity(applications.len());
        for application in &applications {
            let candidate = self.store.find_user_by_id(application.candidate_id)?;
            data.push(ApplicationView::for_recruiter(
                application,
                &job,
                candidate.as_ref(),
            ));
        }

        Ok(Paginated::new(data, total, page))
    }

    pub fn stats(&self, actor: &Session) -> Result<CandidateStats, ServiceError> {
        require_role(actor, Role::Candidate, "Only candidates have a dashboard")?;
        Ok(CandidateStats {
            applied: self.store.count_applications_by_candidate(actor.user_id)?,
            pending: self.store.count_pending_by_candidate(actor.user_id)?,
        })
    }

    /// Candidate pulls a PENDING application while the job is still accepting them.
    pub fn withdraw(
        &self,
        actor: &Session,
        application_id: ApplicationId,
    ) -> Result<ApplicationView, ServiceError> {
        require_role(
            actor,
            Role::Candidate,
            "Only candidates can cancel applications",
        )?;
        let application = self
            .store
            .find_application_by_id(application_id)?
            .ok_or_else(|| ServiceError::not_found("application not found"))?;
        ensure_owner(
            actor,
            application.candidate_id,
            "unauthorized: application does not belong to candidate",
        )?;
        if application.status.is_terminal() {
            return Err(ServiceError::invalid_state(format!(
                "only PENDING applications can be canceled (current: {})",
                application.status
            )));
        }
        let job = self.store.find_job_by_id(application.job_id)?;
        if job.as_ref().map(|job| job.status) == Some(JobStatus::Closed) {
            return Err(ServiceError::invalid_state(
                "applications to a CLOSED job can no longer be canceled",
            ));
        }

        let canceled = self.store.update_application(Application {
            status: ApplicationStatus::Canceled,
            ..application
        })?;

        info!(
            application_id = %canceled.id,
            job_id = %canceled.job_id,
            candidate_id = %actor.user_id,
            "application canceled"
        );
        Ok(ApplicationView::for_candidate(&canceled, job.as_ref()))
    }

    /// Candidate ids with an application on the job, in submission order.
    pub fn applicants(&self, job_id: JobId) -> Result<Vec<UserId>, ServiceError> {
        let mut applications = self.store.find_applications_by_job(job_id)?;
        applications.sort_by_key(|application| (application.created_at, application.id));
        Ok(applications
            .into_iter()
            .map(|application| application.candidate_id)
            .collect())
    }

    fn load_job(&self, job_id: JobId) -> Result<Job, ServiceError> {
        self.store
            .find_job_by_id(job_id)?
            .ok_or_else(|| ServiceError::not_found("job not found"))
    }
}
