use serde::Serialize;

use super::domain::{Job, JobId, JobStatus};
use crate::identity::{User, UserId};
use crate::workflows::applications::ApplicationId;

/// Outbound representation of a posting. Recruiter identity is dropped for anonymous jobs,
/// whoever is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub requirements: String,
    pub salary: String,
    pub status: JobStatus,
    pub anonymous: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_email: Option<String>,
}

impl JobView {
    pub fn new(job: Job, recruiter: Option<&User>) -> Self {
        let (recruiter_id, recruiter_email) = if job.anonymous {
            (None, None)
        } else {
            (
                Some(job.recruiter_id),
                recruiter
                    .filter(|user| user.id == job.recruiter_id)
                    .map(|user| user.email.clone()),
            )
        };

        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            requirements: job.requirements,
            salary: job.salary,
            status: job.status,
            anonymous: job.anonymous,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            recruiter_id,
            recruiter_email,
        }
    }
}

/// Result of a successful finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeOutcome {
    pub message: &'static str,
    pub job: JobView,
    pub hired_application_id: ApplicationId,
    pub rejected: usize,
    pub canceled_untouched: usize,
}
