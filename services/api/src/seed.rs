use recruitment::identity::{RegisterInput, Role, Session, UserRepository};
use recruitment::workflows::jobs::{JobDraft, JobFilter, JobRepository};
use recruitment::workflows::listing::PageRequest;
use recruitment::{ApiState, ServiceError, Store};
use tracing::{info, warn};

pub(crate) const DEFAULT_SEED_JOBS: usize = 100;
pub(crate) const SEED_RECRUITER_EMAIL: &str = "teste@empresa.com";
pub(crate) const SEED_RECRUITER_PASSWORD: &str = "123456";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeedOutcome {
    Skipped,
    Seeded { jobs: usize },
}

/// Populate an empty store with a demo recruiter and `jobs` open postings.
pub(crate) fn seed_demo_data<S>(
    store: &S,
    state: &ApiState<S>,
    jobs: usize,
) -> Result<SeedOutcome, ServiceError>
where
    S: Store,
{
    let (_, existing) = store.find_jobs(&JobFilter::default(), PageRequest::new(1, 1))?;
    if existing > 0 {
        info!(existing, "jobs already exist, skipping seed");
        return Ok(SeedOutcome::Skipped);
    }

    let recruiter = match store.find_user_by_email(SEED_RECRUITER_EMAIL)? {
        Some(user) => user.id,
        None => {
            state
                .identity
                .register(RegisterInput {
                    name: "Teste Recruiter".to_string(),
                    email: SEED_RECRUITER_EMAIL.to_string(),
                    password: SEED_RECRUITER_PASSWORD.to_string(),
                    role: Role::Recruiter.label().to_string(),
                })?
                .id
        }
    };
    let session = Session {
        user_id: recruiter,
        role: Role::Recruiter,
    };

    let mut created = 0;
    for index in 1..=jobs {
        let draft = JobDraft {
            title: format!("Vaga #{index}"),
            description: "Descrição da vaga".to_string(),
            company: "Empresa Demo".to_string(),
            location: "Remoto".to_string(),
            requirements: "Requisitos básicos".to_string(),
            salary: "8000".to_string(),
            anonymous: false,
        };
        match state.jobs.create(&session, draft) {
            Ok(_) => created += 1,
            Err(err) => warn!(index, error = %err, "failed to seed job"),
        }
    }

    info!(jobs = created, recruiter = SEED_RECRUITER_EMAIL, "store seeded");
    Ok(SeedOutcome::Seeded { jobs: created })
}
