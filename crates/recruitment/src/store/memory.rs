use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::RepositoryError;
use crate::identity::{NewUser, User, UserId, UserRepository};
use crate::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, NewApplication,
};
use crate::workflows::jobs::{Job, JobFilter, JobId, JobRepository, JobStatus, NewJob};
use crate::workflows::listing::PageRequest;

/// Process-local store. A single lock covers every table, so each call is atomic: the
/// uniqueness checks and status check-and-set writes cannot interleave.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    user_sequence: u64,
    job_sequence: u64,
    application_sequence: u64,
}

impl MemoryStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

fn newest_first_jobs(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    jobs
}

fn newest_first_applications(mut applications: Vec<Application>) -> Vec<Application> {
    applications.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    applications
}

impl UserRepository for MemoryStore {
    fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict);
        }

        tables.user_sequence += 1;
        let now = Utc::now();
        let record = User {
            id: UserId(tables.user_sequence),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables()?.users.get(&id).cloned())
    }
}

impl JobRepository for MemoryStore {
    fn create_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let mut tables = self.tables()?;
        tables.job_sequence += 1;
        let now = Utc::now();
        let record = Job {
            id: JobId(tables.job_sequence),
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            requirements: job.requirements,
            salary: job.salary,
            status: JobStatus::Open,
            recruiter_id: job.recruiter_id,
            anonymous: job.anonymous,
            created_at: now,
            updated_at: now,
        };
        tables.jobs.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_job(&self, job: Job, expected: JobStatus) -> Result<Job, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables.jobs.get_mut(&job.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StateMismatch {
                expected: expected.label(),
                actual: stored.status.label(),
            });
        }

        // identity and ownership columns are not writable through an update
        stored.title = job.title;
        stored.description = job.description;
        stored.company = job.company;
        stored.location = job.location;
        stored.requirements = job.requirements;
        stored.salary = job.salary;
        stored.status = job.status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn transition_job_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Job, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables.jobs.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if stored.status != from {
            return Err(RepositoryError::StateMismatch {
                expected: from.label(),
                actual: stored.status.label(),
            });
        }
        stored.status = to;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn find_job_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.tables()?.jobs.get(&id).cloned())
    }

    fn find_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, u64), RepositoryError> {
        let matching = self
            .tables()?
            .jobs
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        Ok(page.slice(newest_first_jobs(matching)))
    }

    fn find_jobs_by_recruiter(
        &self,
        recruiter: UserId,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, u64), RepositoryError> {
        let matching = self
            .tables()?
            .jobs
            .values()
            .filter(|job| job.recruiter_id == recruiter && filter.matches(job))
            .cloned()
            .collect();
        Ok(page.slice(newest_first_jobs(matching)))
    }
}

impl ApplicationRepository for MemoryStore {
    fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.applications.values().any(|existing| {
            existing.job_id == application.job_id
                && existing.candidate_id == application.candidate_id
        }) {
            return Err(RepositoryError::Conflict);
        }

        tables.application_sequence += 1;
        let now = Utc::now();
        let record = Application {
            id: ApplicationId(tables.application_sequence),
            job_id: application.job_id,
            candidate_id: application.candidate_id,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.applications.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.tables()?;
        let stored = tables
            .applications
            .get_mut(&application.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.status = application.status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn find_application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.tables()?.applications.get(&id).cloned())
    }

    fn application_exists(&self, job: JobId, candidate: UserId) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .any(|application| application.job_id == job && application.candidate_id == candidate))
    }

    fn find_applications_by_job(&self, job: JobId) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .filter(|application| application.job_id == job)
            .cloned()
            .collect())
    }

    fn find_application_page_by_job(
        &self,
        job: JobId,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Application>, u64), RepositoryError> {
        let matching = self
            .tables()?
            .applications
            .values()
            .filter(|application| application.job_id == job)
            .filter(|application| status.map_or(true, |wanted| application.status == wanted))
            .cloned()
            .collect();
        Ok(page.slice(newest_first_applications(matching)))
    }

    fn find_applications_by_candidate(
        &self,
        candidate: UserId,
        page: PageRequest,
    ) -> Result<(Vec<Application>, u64), RepositoryError> {
        let matching = self
            .tables()?
            .applications
            .values()
            .filter(|application| application.candidate_id == candidate)
            .cloned()
            .collect();
        Ok(page.slice(newest_first_applications(matching)))
    }

    fn count_applications_by_candidate(&self, candidate: UserId) -> Result<u64, RepositoryError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .filter(|application| application.candidate_id == candidate)
            .count() as u64)
    }

    fn count_pending_by_candidate(&self, candidate: UserId) -> Result<u64, RepositoryError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .filter(|application| {
                application.candidate_id == candidate
                    && application.status == ApplicationStatus::Pending
            })
            .count() as u64)
    }
}
