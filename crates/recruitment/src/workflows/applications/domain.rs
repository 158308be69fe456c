use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::workflows::jobs::JobId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// PENDING is the only non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Pending,
    Rejected,
    Hired,
    Canceled,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Hired => "HIRED",
            ApplicationStatus::Canceled => "CANCELED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    pub fn parse_filter(raw: Option<&str>) -> Option<Self> {
        match raw?.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(ApplicationStatus::Pending),
            "REJECTED" => Some(ApplicationStatus::Rejected),
            "HIRED" => Some(ApplicationStatus::Hired),
            "CANCELED" => Some(ApplicationStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: UserId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application ready to be persisted; the store stamps it PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: JobId,
    pub candidate_id: UserId,
}
