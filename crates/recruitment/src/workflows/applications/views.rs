use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Application, ApplicationId, ApplicationStatus};
use crate::identity::{User, UserId};
use crate::workflows::jobs::{Job, JobId};

/// Application as shown to candidates (with job details) or recruiters (with candidate name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub job_id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub candidate_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: NaiveDate,
}

impl ApplicationView {
    fn bare(application: &Application) -> Self {
        Self {
            id: application.id,
            job_id: application.job_id,
            job_title: None,
            company: None,
            location: None,
            candidate_id: application.candidate_id,
            candidate_name: None,
            status: application.status,
            applied_at: application.created_at.date_naive(),
        }
    }

    pub fn for_candidate(application: &Application, job: Option<&Job>) -> Self {
        let mut view = Self::bare(application);
        if let Some(job) = job {
            view.job_title = Some(job.title.clone());
            view.company = Some(job.company.clone());
            view.location = Some(job.location.clone());
        }
        view
    }

    pub fn for_recruiter(application: &Application, job: &Job, candidate: Option<&User>) -> Self {
        let mut view = Self::bare(application);
        view.job_title = Some(job.title.clone());
        view.candidate_name = candidate.map(|user| user.name.clone());
        view
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateStats {
    pub applied: u64,
    pub pending: u64,
}
