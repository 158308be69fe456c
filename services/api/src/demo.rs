use recruitment::config::{AuthConfig, LifecycleConfig};
use recruitment::error::AppError;
use recruitment::identity::{RegisterInput, Role, Session};
use recruitment::workflows::jobs::JobDraft;
use recruitment::workflows::listing::PageRequest;
use recruitment::{ApiState, MemoryStore, ServiceError};
use std::sync::Arc;

const DEMO_PASSWORD: &str = "123456";

pub(crate) fn run_demo() -> Result<(), AppError> {
    let auth = AuthConfig {
        jwt_secret: "demo-only-secret".to_string(),
        token_ttl_hours: 1,
        bcrypt_cost: 4,
    };
    let state = ApiState::new(
        Arc::new(MemoryStore::default()),
        &auth,
        LifecycleConfig::default(),
    );

    println!("== Recruitment hiring demo ==");

    let recruiter = sign_up(&state, "Rita Recruiter", "rita@empresa.com", Role::Recruiter)?;
    let ana = sign_up(&state, "Ana Candidate", "ana@mail.com", Role::Candidate)?;
    let bruno = sign_up(&state, "Bruno Candidate", "bruno@mail.com", Role::Candidate)?;
    let caio = sign_up(&state, "Caio Candidate", "caio@mail.com", Role::Candidate)?;

    let job = state.jobs.create(
        &recruiter,
        JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the hiring platform APIs".to_string(),
            company: "Empresa Demo".to_string(),
            location: "Remoto".to_string(),
            requirements: "Rust, SQL".to_string(),
            salary: "8000".to_string(),
            anonymous: false,
        },
    )?;
    println!("Job #{} '{}' is {}", job.id, job.title, job.status);

    for (label, candidate) in [("Ana", &ana), ("Bruno", &bruno), ("Caio", &caio)] {
        let application = state.applications.apply(candidate, job.id)?;
        println!(
            "  {label} applied (application #{}, {})",
            application.id, application.status
        );
    }

    match state.applications.apply(&ana, job.id) {
        Err(ServiceError::Conflict(message)) => println!("  Ana applies again: {message}"),
        Err(err) => println!("  Ana applies again: unexpected error {err}"),
        Ok(_) => println!("  Ana applies again: unexpectedly accepted"),
    }

    let caio_applications = state
        .applications
        .list_for_candidate(&caio, PageRequest::default())?;
    if let Some(application) = caio_applications.data.first() {
        state.applications.withdraw(&caio, application.id)?;
        println!("  Caio withdrew application #{}", application.id);
    }

    let order: Vec<String> = state
        .applications
        .applicants(job.id)?
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("  Candidate ids in submission order: {}", order.join(", "));

    let outcome = state.jobs.finalize(&recruiter, job.id, bruno.user_id)?;
    println!(
        "Finalized job #{}: {} (hired application #{}, {} rejected, {} canceled left as is)",
        outcome.job.id,
        outcome.message,
        outcome.hired_application_id,
        outcome.rejected,
        outcome.canceled_untouched
    );

    let applicants = state
        .applications
        .list_for_job(&recruiter, job.id, None, PageRequest::default())?;
    println!("Final application states:");
    for application in applicants.data {
        println!(
            "  - {}: {}",
            application
                .candidate_name
                .as_deref()
                .unwrap_or("unknown candidate"),
            application.status
        );
    }

    match state.applications.apply(&ana, job.id) {
        Err(err) => println!("Applying to the closed job: {err}"),
        Ok(_) => println!("Applying to the closed job: unexpectedly accepted"),
    }

    let stats = state.applications.stats(&ana)?;
    println!(
        "Ana's dashboard: {} applied, {} pending",
        stats.applied, stats.pending
    );

    Ok(())
}

fn sign_up(
    state: &ApiState<MemoryStore>,
    name: &str,
    email: &str,
    role: Role,
) -> Result<Session, ServiceError> {
    state.identity.register(RegisterInput {
        name: name.to_string(),
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: role.label().to_string(),
    })?;
    let login = state.identity.login(email, DEMO_PASSWORD)?;
    state.identity.validate_token(&login.token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenario_runs_to_completion() {
        run_demo().expect("demo completes");
    }
}
