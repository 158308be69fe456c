use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{FinalizeMode, Job, JobDraft, JobFilter, JobId, JobPatch, JobStatus};
use super::views::{FinalizeOutcome, JobView};
use crate::error::ServiceError;
use crate::identity::{Role, Session, User, UserId};
use crate::store::{RepositoryError, Store};
use crate::workflows::applications::{Application, ApplicationId, ApplicationStatus};
use crate::workflows::listing::{PageRequest, Paginated};
use crate::workflows::policy::{ensure_owner, require_role};

/// Owns every job state transition and the cascade onto its applications.
pub struct JobLifecycleService<S> {
    store: Arc<S>,
    finalize_mode: FinalizeMode,
}

/// Tally of one pass over a job's applications during finalize.
struct Resolution {
    hired: Option<ApplicationId>,
    target_canceled: bool,
    rejected: usize,
    canceled_untouched: usize,
}

impl<S> JobLifecycleService<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>, finalize_mode: FinalizeMode) -> Self {
        Self {
            store,
            finalize_mode,
        }
    }

    pub fn finalize_mode(&self) -> FinalizeMode {
        self.finalize_mode
    }

    pub fn create(&self, actor: &Session, draft: JobDraft) -> Result<JobView, ServiceError> {
        require_role(actor, Role::Recruiter, "Only recruiters can create jobs")?;
        let new_job = draft.into_new_job(actor.user_id)?;
        let job = self.store.create_job(new_job)?;

        info!(job_id = %job.id, recruiter_id = %job.recruiter_id, anonymous = job.anonymous, "job created");
        self.view(job)
    }

    pub fn update(
        &self,
        actor: &Session,
        job_id: JobId,
        patch: JobPatch,
    ) -> Result<JobView, ServiceError> {
        require_role(actor, Role::Recruiter, "Only recruiters can update jobs")?;
        let mut job = self.load(job_id)?;
        ensure_owner(
            actor,
            job.recruiter_id,
            "unauthorized: job does not belong to recruiter",
        )?;
        if job.status == JobStatus::Closed {
            return Err(ServiceError::invalid_state(
                "only OPEN or PAUSED jobs can be updated",
            ));
        }
        if patch.is_empty() {
            return self.view(job);
        }

        let expected = job.status;
        patch.apply(&mut job)?;
        let job = self.store.update_job(job, expected).map_err(|err| match err {
            RepositoryError::StateMismatch { .. } => {
                ServiceError::invalid_state("job status changed while updating; retry")
            }
            other => ServiceError::Repository(other),
        })?;

        info!(job_id = %job.id, status = %job.status, "job updated");
        self.view(job)
    }

    /// Close the job and resolve its applications: the chosen candidate is HIRED, every other
    /// application not CANCELED becomes REJECTED.
    pub fn finalize(
        &self,
        actor: &Session,
        job_id: JobId,
        candidate_id: UserId,
    ) -> Result<FinalizeOutcome, ServiceError> {
        require_role(actor, Role::Recruiter, "Only recruiters can finalize jobs")?;
        let job = self.load(job_id)?;
        ensure_owner(
            actor,
            job.recruiter_id,
            "unauthorized: job does not belong to recruiter",
        )?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::invalid_state(
                "only OPEN jobs can be finalized",
            ));
        }

        match self.finalize_mode {
            FinalizeMode::Lenient => self.finalize_lenient(job_id, candidate_id),
            FinalizeMode::Strict => self.finalize_strict(job_id, candidate_id),
        }
    }

    pub fn get(&self, job_id: JobId) -> Result<JobView, ServiceError> {
        let job = self.load(job_id)?;
        self.view(job)
    }

    pub fn list(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Paginated<JobView>, ServiceError> {
        let (jobs, total) = self.store.find_jobs(filter, page)?;
        let data = self.views(jobs)?;
        Ok(Paginated::new(data, total, page))
    }

    pub fn list_by_recruiter(
        &self,
        actor: &Session,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Paginated<JobView>, ServiceError> {
        require_role(actor, Role::Recruiter, "Only recruiters can view their jobs")?;
        let (jobs, total) = self
            .store
            .find_jobs_by_recruiter(actor.user_id, filter, page)?;
        let data = self.views(jobs)?;
        Ok(Paginated::new(data, total, page))
    }

    fn finalize_lenient(
        &self,
        job_id: JobId,
        candidate_id: UserId,
    ) -> Result<FinalizeOutcome, ServiceError> {
        let closed = self.close(job_id)?;
        let applications = self.store.find_applications_by_job(job_id)?;
        let mut journal = Vec::new();
        let resolution = self.resolve(applications, candidate_id, &mut journal)?;

        self.outcome(closed, candidate_id, resolution)
            .inspect_err(|err| {
                warn!(job_id = %job_id, candidate_id = %candidate_id, error = %err, "job closed without a hire");
            })
    }

    fn finalize_strict(
        &self,
        job_id: JobId,
        candidate_id: UserId,
    ) -> Result<FinalizeOutcome, ServiceError> {
        let applications = self.store.find_applications_by_job(job_id)?;
        check_target(&applications, candidate_id)?;

        let closed = self.close(job_id)?;
        // reread so an application slipped in before the close is resolved too
        let applications = self.store.find_applications_by_job(job_id)?;
        let mut journal = Vec::new();
        let result = self
            .resolve(applications, candidate_id, &mut journal)
            .and_then(|resolution| self.outcome(closed, candidate_id, resolution));

        if let Err(err) = &result {
            warn!(job_id = %job_id, error = %err, "finalize failed; restoring job and applications");
            self.roll_back(job_id, journal);
        }
        result
    }

    fn close(&self, job_id: JobId) -> Result<Job, ServiceError> {
        self.store
            .transition_job_status(job_id, JobStatus::Open, JobStatus::Closed)
            .map_err(|err| match err {
                RepositoryError::StateMismatch { .. } => {
                    ServiceError::invalid_state("only OPEN jobs can be finalized")
                }
                RepositoryError::NotFound => ServiceError::not_found("job not found"),
                other => ServiceError::Repository(other),
            })
    }

    /// Evaluate every application before reporting a missing target. Each write is
    /// persisted on its own; `journal` keeps the prior version of everything written.
    fn resolve(
        &self,
        applications: Vec<Application>,
        candidate_id: UserId,
        journal: &mut Vec<Application>,
    ) -> Result<Resolution, ServiceError> {
        let mut resolution = Resolution {
            hired: None,
            target_canceled: false,
            rejected: 0,
            canceled_untouched: 0,
        };

        for application in applications {
            let next = if application.status == ApplicationStatus::Canceled {
                if application.candidate_id == candidate_id {
                    resolution.target_canceled = true;
                }
                resolution.canceled_untouched += 1;
                continue;
            } else if application.candidate_id == candidate_id {
                ApplicationStatus::Hired
            } else {
                ApplicationStatus::Rejected
            };

            let previous = application.clone();
            let mut updated = application;
            updated.status = next;
            let stored = self.store.update_application(updated)?;
            journal.push(previous);

            match next {
                ApplicationStatus::Hired => resolution.hired = Some(stored.id),
                _ => resolution.rejected += 1,
            }
        }

        Ok(resolution)
    }

    fn outcome(
        &self,
        closed: Job,
        candidate_id: UserId,
        resolution: Resolution,
    ) -> Result<FinalizeOutcome, ServiceError> {
        if resolution.target_canceled {
            return Err(ServiceError::invalid_state(format!(
                "candidate {candidate_id} canceled their application"
            )));
        }
        let hired = resolution.hired.ok_or_else(|| {
            ServiceError::not_found("candidate application not found for this job")
        })?;

        info!(
            job_id = %closed.id,
            hired_application_id = %hired,
            rejected = resolution.rejected,
            "job finalized"
        );

        Ok(FinalizeOutcome {
            message: "Job finalized and candidate hired",
            job: self.view(closed)?,
            hired_application_id: hired,
            rejected: resolution.rejected,
            canceled_untouched: resolution.canceled_untouched,
        })
    }

    fn roll_back(&self, job_id: JobId, journal: Vec<Application>) {
        for previous in journal.into_iter().rev() {
            let application_id = previous.id;
            if let Err(err) = self.store.update_application(previous) {
                warn!(job_id = %job_id, application_id = %application_id, error = %err, "could not restore application");
            }
        }
        if let Err(err) =
            self.store
                .transition_job_status(job_id, JobStatus::Closed, JobStatus::Open)
        {
            warn!(job_id = %job_id, error = %err, "could not reopen job");
        }
    }

    fn load(&self, job_id: JobId) -> Result<Job, ServiceError> {
        self.store
            .find_job_by_id(job_id)?
            .ok_or_else(|| ServiceError::not_found("job not found"))
    }

    fn view(&self, job: Job) -> Result<JobView, ServiceError> {
        if job.anonymous {
            return Ok(JobView::new(job, None));
        }
        let recruiter = self.store.find_user_by_id(job.recruiter_id)?;
        Ok(JobView::new(job, recruiter.as_ref()))
    }

    fn views(&self, jobs: Vec<Job>) -> Result<Vec<JobView>, ServiceError> {
        let mut recruiters: BTreeMap<UserId, Option<User>> = BTreeMap::new();
        let mut views = Vec::with_capacity(jobs.len());
        for job in jobs {
            if job.anonymous {
                views.push(JobView::new(job, None));
                continue;
            }
            if !recruiters.contains_key(&job.recruiter_id) {
                let user = self.store.find_user_by_id(job.recruiter_id)?;
                recruiters.insert(job.recruiter_id, user);
            }
            let recruiter = recruiters.get(&job.recruiter_id).and_then(Option::as_ref);
            views.push(JobView::new(job, recruiter));
        }
        Ok(views)
    }
}

fn check_target(applications: &[Application], candidate_id: UserId) -> Result<(), ServiceError> {
    match applications
        .iter()
        .find(|application| application.candidate_id == candidate_id)
    {
        None => Err(ServiceError::not_found(
            "candidate application not found for this job",
        )),
        Some(application) if application.status == ApplicationStatus::Canceled => {
            Err(ServiceError::invalid_state(format!(
                "candidate {candidate_id} canceled their application"
            )))
        }
        Some(_) => Ok(()),
    }
}
