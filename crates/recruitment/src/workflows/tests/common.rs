use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::identity::{NewUser, Role, Session, User, UserId, UserRepository};
use crate::store::{MemoryStore, RepositoryError, Store};
use crate::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, NewApplication,
};
use crate::workflows::jobs::{
    FinalizeMode, Job, JobDraft, JobFilter, JobId, JobRepository, JobStatus, NewJob,
};
use crate::workflows::listing::PageRequest;
use crate::workflows::{ApplicationLifecycleService, JobLifecycleService};

pub(super) struct Harness<S> {
    pub store: Arc<S>,
    pub jobs: JobLifecycleService<S>,
    pub applications: ApplicationLifecycleService<S>,
}

pub(super) fn harness() -> Harness<MemoryStore> {
    harness_with(MemoryStore::default(), FinalizeMode::Lenient)
}

pub(super) fn harness_with<S: Store>(store: S, mode: FinalizeMode) -> Harness<S> {
    let store = Arc::new(store);
    Harness {
        jobs: JobLifecycleService::new(store.clone(), mode),
        applications: ApplicationLifecycleService::new(store.clone()),
        store,
    }
}

impl<S: Store> Harness<S> {
    pub fn user(&self, name: &str, role: Role) -> Session {
        let email = format!("{}@mail.com", name.to_lowercase().replace(' ', "."));
        let user = self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email,
                password_hash: "not-a-real-hash".to_string(),
                role,
            })
            .expect("user stored");
        Session {
            user_id: user.id,
            role,
        }
    }

    pub fn recruiter(&self, name: &str) -> Session {
        self.user(name, Role::Recruiter)
    }

    pub fn candidate(&self, name: &str) -> Session {
        self.user(name, Role::Candidate)
    }

    pub fn open_job(&self, recruiter: &Session, title: &str) -> JobId {
        self.jobs
            .create(recruiter, draft(title))
            .expect("job created")
            .id
    }

    pub fn apply(&self, candidate: &Session, job: JobId) -> ApplicationId {
        self.applications
            .apply(candidate, job)
            .expect("application accepted")
            .id
    }

    pub fn job_status(&self, job: JobId) -> JobStatus {
        self.store
            .find_job_by_id(job)
            .expect("read job")
            .expect("job present")
            .status
    }

    pub fn application_status(&self, application: ApplicationId) -> ApplicationStatus {
        self.store
            .find_application_by_id(application)
            .expect("read application")
            .expect("application present")
            .status
    }
}

pub(super) fn draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: format!("{title} role working on the hiring platform"),
        company: "Empresa Demo".to_string(),
        location: "Remoto".to_string(),
        requirements: "Rust".to_string(),
        salary: "R$ 8.000".to_string(),
        anonymous: false,
    }
}

/// Delegates to a [`MemoryStore`] but fails a single `update_application` once a budget of
/// successful writes is spent. Later writes go through again.
#[derive(Default)]
pub(super) struct FlakyStore {
    pub inner: MemoryStore,
    writes_left: AtomicUsize,
    armed: AtomicBool,
}

impl FlakyStore {
    pub fn fail_after(&self, successful_writes: usize) {
        self.writes_left.store(successful_writes, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl UserRepository for FlakyStore {
    fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.inner.create_user(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user_by_email(email)
    }

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user_by_id(id)
    }
}

impl JobRepository for FlakyStore {
    fn create_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        self.inner.create_job(job)
    }

    fn update_job(&self, job: Job, expected: JobStatus) -> Result<Job, RepositoryError> {
        self.inner.update_job(job, expected)
    }

    fn transition_job_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Job, RepositoryError> {
        self.inner.transition_job_status(id, from, to)
    }

    fn find_job_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.find_job_by_id(id)
    }

    fn find_jobs(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, u64), RepositoryError> {
        self.inner.find_jobs(filter, page)
    }

    fn find_jobs_by_recruiter(
        &self,
        recruiter: UserId,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, u64), RepositoryError> {
        self.inner.find_jobs_by_recruiter(recruiter, filter, page)
    }
}

impl ApplicationRepository for FlakyStore {
    fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        self.inner.create_application(application)
    }

    fn update_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        if self.armed.load(Ordering::SeqCst) {
            let spent = self
                .writes_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                    left.checked_sub(1)
                })
                .is_err();
            if spent {
                self.armed.store(false, Ordering::SeqCst);
                return Err(RepositoryError::Unavailable("injected write failure".to_string()));
            }
        }
        self.inner.update_application(application)
    }

    fn find_application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.find_application_by_id(id)
    }

    fn application_exists(&self, job: JobId, candidate: UserId) -> Result<bool, RepositoryError> {
        self.inner.application_exists(job, candidate)
    }

    fn find_applications_by_job(&self, job: JobId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.find_applications_by_job(job)
    }

    fn find_application_page_by_job(
        &self,
        job: JobId,
        status: Option<ApplicationStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Application>, u64), RepositoryError> {
        self.inner.find_application_page_by_job(job, status, page)
    }

    fn find_applications_by_candidate(
        &self,
        candidate: UserId,
        page: PageRequest,
    ) -> Result<(Vec<Application>, u64), RepositoryError> {
        self.inner.find_applications_by_candidate(candidate, page)
    }

    fn count_applications_by_candidate(&self, candidate: UserId) -> Result<u64, RepositoryError> {
        self.inner.count_applications_by_candidate(candidate)
    }

    fn count_pending_by_candidate(&self, candidate: UserId) -> Result<u64, RepositoryError> {
        self.inner.count_pending_by_candidate(candidate)
    }
}
