use super::common::*;
use crate::error::ServiceError;
use crate::identity::UserId;
use crate::store::RepositoryError;
use crate::workflows::applications::{ApplicationRepository, ApplicationStatus};
use crate::workflows::jobs::{FinalizeMode, JobPatch, JobStatus};

#[test]
fn finalize_hires_target_and_rejects_the_rest() {
    let harness = harness();
    let recruiter = harness.recruiter("Rita");
    let ana = harness.candidate("Ana");
    let bruno = harness.candidate("Bruno");
    let caio = harness.candidate("Caio");
    let job = harness.open_job(&recruiter, "Backend");

    let ana_app = harness.apply(&ana, job);
    let bruno_app = harness.apply(&bruno, job);
    let caio_app = harness.apply(&caio, job);
    harness
        .applications
        .withdraw(&caio, caio_app)
        .expect("withdrawn");

    let outcome = harness
        .jobs
        .finalize(&recruiter, job, bruno.user_id)
        .expect("finalized");

    assert_eq!(outcome.job.status, JobStatus::Closed);
    assert_eq!(outcome.hired_application_id, bruno_app);
    assert_eq!(outcome.rejected, 1);
    assert_eq!(outcome.canceled_untouched, 1);
    assert_eq!(harness.job_status(job), JobStatus::Closed);
    assert_eq!(harness.application_status(bruno_app), ApplicationStatus::Hired);
    assert_eq!(harness.application_status(ana_app), ApplicationStatus::Rejected);
    assert_eq!(harness.application_status(caio_app), ApplicationStatus::Canceled);

    let hired = harness
        .store
        .find_applications_by_job(job)
        .expect("read")
        .into_iter()
        .filter(|application| application.status == ApplicationStatus::Hired)
        .count();
    assert_eq!(hired, 1);
}

#[test]
fn finalize_requires_owner_recruiter_and_open_job() {
    let harness = harness();
    let owner = harness.recruiter("Rita");
    let rival = harness.recruiter("Rafa");
    let candidate = harness.candidate("Ana");
    let job = harness.open_job(&owner, "Backend");
    harness.apply(&candidate, job);

    assert!(matches!(
        harness.jobs.finalize(&candidate, job, candidate.user_id),
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        harness.jobs.finalize(&rival, job, candidate.user_id),
        Err(ServiceError::Forbidden(_))
    ));

    harness
        .jobs
        .update(
            &owner,
            job,
            JobPatch {
                status: Some("PAUSED".to_string()),
                ..JobPatch::default()
            },
        )
        .expect("paused");
    assert!(matches!(
        harness.jobs.finalize(&owner, job, candidate.user_id),
        Err(ServiceError::InvalidState(message)) if message == "only OPEN jobs can be finalized"
    ));
    assert_eq!(harness.job_status(job), JobStatus::Paused);
}

#[test]
fn second_finalize_is_rejected_and_changes_nothing() {
    let harness = harness();
    let recruiter = harness.recruiter("Rita");
    let ana = harness.candidate("Ana");
    let bruno = harness.candidate("Bruno");
    let job = harness.open_job(&recruiter, "Backend");
    let ana_app = harness.apply(&ana, job);
    let bruno_app = harness.apply(&bruno, job);

    harness
        .jobs
        .finalize(&recruiter, job, ana.user_id)
        .expect("first finalize");
    assert!(matches!(
        harness.jobs.finalize(&recruiter, job, bruno.user_id),
        Err(ServiceError::InvalidState(_))
    ));

    assert_eq!(harness.application_status(ana_app), ApplicationStatus::Hired);
    assert_eq!(harness.application_status(bruno_app), ApplicationStatus::Rejected);
}

#[test]
fn lenient_finalize_for_unknown_candidate_still_closes_the_job() {
    let harness = harness();
    let recruiter = harness.recruiter("Rita");
    let ana = harness.candidate("Ana");
    let job = harness.open_job(&recruiter, "Backend");
    let ana_app = harness.apply(&ana, job);

    match harness.jobs.finalize(&recruiter, job, UserId(4242)) {
        Err(ServiceError::NotFound(message)) => {
            assert_eq!(message, "candidate application not found for this job")
        }
        other => panic!("expected not found, got {other:?}"),
    }

    assert_eq!(harness.job_status(job), JobStatus::Closed);
    assert_eq!(harness.application_status(ana_app), ApplicationStatus::Rejected);
}

#[test]
fn finalize_rejects_a_canceled_target_in_both_modes() {
    for mode in [FinalizeMode::Lenient, FinalizeMode::Strict] {
        let harness = harness_with(FlakyStore::default(), mode);
        let recruiter = harness.recruiter("Rita");
        let ana = harness.candidate("Ana");
        let job = harness.open_job(&recruiter, "Backend");
        let ana_app = harness.apply(&ana, job);
        harness
            .applications
            .withdraw(&ana, ana_app)
            .expect("withdrawn");

        assert!(matches!(
            harness.jobs.finalize(&recruiter, job, ana.user_id),
            Err(ServiceError::InvalidState(_))
        ));
        assert_eq!(harness.application_status(ana_app), ApplicationStatus::Canceled);

        let expected = match mode {
            FinalizeMode::Lenient => JobStatus::Closed,
            FinalizeMode::Strict => JobStatus::Open,
        };
        assert_eq!(harness.job_status(job), expected, "mode {mode:?}");
    }
}

#[test]
fn strict_finalize_checks_target_before_closing() {
    let harness = harness_with(FlakyStore::default(), FinalizeMode::Strict);
    let recruiter = harness.recruiter("Rita");
    let ana = harness.candidate("Ana");
    let job = harness.open_job(&recruiter, "Backend");
    let ana_app = harness.apply(&ana, job);

    assert!(matches!(
        harness.jobs.finalize(&recruiter, job, UserId(4242)),
        Err(ServiceError::NotFound(_))
    ));
    assert_eq!(harness.job_status(job), JobStatus::Open);
    assert_eq!(harness.application_status(ana_app), ApplicationStatus::Pending);
}

#[test]
fn lenient_finalize_keeps_partial_writes_after_a_store_failure() {
    let harness = harness_with(FlakyStore::default(), FinalizeMode::Lenient);
    let recruiter = harness.recruiter("Rita");
    let ana = harness.candidate("Ana");
    let bruno = harness.candidate("Bruno");
    let job = harness.open_job(&recruiter, "Backend");
    let ana_app = harness.apply(&ana, job);
    let bruno_app = harness.apply(&bruno, job);

    harness.store.fail_after(1);
    assert!(matches!(
        harness.jobs.finalize(&recruiter, job, bruno.user_id),
        Err(ServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    harness.store.disarm();

    assert_eq!(harness.job_status(job), JobStatus::Closed);
    let statuses = [
        harness.application_status(ana_app),
        harness.application_status(bruno_app),
    ];
    assert_eq!(
        statuses
            .iter()
            .filter(|status| **status == ApplicationStatus::Pending)
            .count(),
        1,
        "exactly one write landed before the failure: {statuses:?}"
    );
}

#[test]
fn strict_finalize_restores_everything_after_a_store_failure() {
    let harness = harness_with(FlakyStore::default(), FinalizeMode::Strict);
    let recruiter = harness.recruiter("Rita");
    let ana = harness.candidate("Ana");
    let bruno = harness.candidate("Bruno");
    let job = harness.open_job(&recruiter, "Backend");
    let ana_app = harness.apply(&ana, job);
    let bruno_app = harness.apply(&bruno, job);

    harness.store.fail_after(1);
    let result = harness.jobs.finalize(&recruiter, job, bruno.user_id);
    harness.store.disarm();
    assert!(matches!(result, Err(ServiceError::Repository(_))));

    assert_eq!(harness.job_status(job), JobStatus::Open);
    assert_eq!(harness.application_status(ana_app), ApplicationStatus::Pending);
    assert_eq!(harness.application_status(bruno_app), ApplicationStatus::Pending);

    let outcome = harness
        .jobs
        .finalize(&recruiter, job, bruno.user_id)
        .expect("retry succeeds");
    assert_eq!(outcome.hired_application_id, bruno_app);
}
