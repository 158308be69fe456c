use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::identity::UserId;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Posting lifecycle: OPEN and PAUSED toggle freely, CLOSED is terminal and only reachable
/// through finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Open,
    Paused,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::Paused => "PAUSED",
            JobStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "OPEN" => Some(JobStatus::Open),
            "PAUSED" => Some(JobStatus::Paused),
            "CLOSED" => Some(JobStatus::Closed),
            _ => None,
        }
    }

    /// Listing filters are forgiving: case and padding are ignored and anything
    /// unrecognized means "no filter".
    pub fn parse_filter(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::parse(&value.trim().to_ascii_uppercase()))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub requirements: String,
    pub salary: String,
    pub status: JobStatus,
    pub recruiter_id: UserId,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job ready to be persisted. The store assigns id, timestamps and the OPEN status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub requirements: String,
    pub salary: String,
    pub recruiter_id: UserId,
    pub anonymous: bool,
}

/// Recruiter supplied fields for a new posting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub anonymous: bool,
}

impl JobDraft {
    pub fn into_new_job(self, recruiter_id: UserId) -> Result<NewJob, ServiceError> {
        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        let company = required("company", self.company)?;
        let location = required("location", self.location)?;

        Ok(NewJob {
            title,
            description,
            company,
            location,
            requirements: self.requirements.trim().to_string(),
            salary: self.salary.trim().to_string(),
            recruiter_id,
            anonymous: self.anonymous,
        })
    }
}

/// Partial update. An absent or blank field leaves the stored value untouched, except
/// `requirements` and `salary`, where an explicit `""` clears the text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub requirements: Option<String>,
    pub salary: Option<String>,
    pub status: Option<String>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.requirements.is_none()
            && self.salary.is_none()
            && self.status.is_none()
    }

    /// Apply onto a copy of the stored job. Validation happens before any field moves so a
    /// rejected patch leaves `job` as it was.
    pub fn apply(self, job: &mut Job) -> Result<(), ServiceError> {
        let status = match given(self.status).as_deref() {
            None => None,
            Some("OPEN") => Some(JobStatus::Open),
            Some("PAUSED") => Some(JobStatus::Paused),
            Some("CLOSED") => {
                return Err(ServiceError::invalid_value(
                    "use finalize endpoint to close a job",
                ))
            }
            Some(other) => {
                return Err(ServiceError::invalid_value(format!(
                    "invalid status '{other}': expected OPEN or PAUSED"
                )))
            }
        };

        if let Some(title) = given(self.title) {
            job.title = title;
        }
        if let Some(description) = given(self.description) {
            job.description = description;
        }
        if let Some(company) = given(self.company) {
            job.company = company;
        }
        if let Some(location) = given(self.location) {
            job.location = location;
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements.trim().to_string();
        }
        if let Some(salary) = self.salary {
            job.salary = salary.trim().to_string();
        }
        if let Some(status) = status {
            job.status = status;
        }
        Ok(())
    }
}

/// Trimmed value of a patch field, with blanks meaning "not supplied".
fn given(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn required(field: &str, value: String) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::invalid_value(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Read-side filter over postings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub text: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobFilter {
    pub fn new(text: Option<&str>, status: Option<&str>) -> Self {
        let text = text
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);
        Self {
            text,
            status: JobStatus::parse_filter(status),
        }
    }

    /// Case-insensitive substring match on title or description plus exact status.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        match &self.text {
            Some(needle) => {
                job.title.to_lowercase().contains(needle.as_str())
                    || job.description.to_lowercase().contains(needle.as_str())
            }
            None => true,
        }
    }
}

/// How finalize behaves when a step after closing the job fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalizeMode {
    /// The job stays CLOSED and earlier application writes stay committed.
    #[default]
    Lenient,
    /// The target application is checked before closing and a later failure reopens the job
    /// and restores the applications already written.
    Strict,
}

impl FinalizeMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(FinalizeMode::Lenient),
            "strict" => Some(FinalizeMode::Strict),
            _ => None,
        }
    }
}
