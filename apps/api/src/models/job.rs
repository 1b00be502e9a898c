use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Job posting lifecycle.
///
/// ```text
/// DRAFT ──► OPEN ──► CLOSED
///   └────────────────►┘
/// ```
///
/// CLOSED is terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "job_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    Draft,
    Open,
    Closed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [JobStatus::Draft, JobStatus::Open, JobStatus::Closed];

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Draft, JobStatus::Open)
                | (JobStatus::Draft, JobStatus::Closed)
                | (JobStatus::Open, JobStatus::Closed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Draft => "DRAFT",
            JobStatus::Open => "OPEN",
            JobStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(JobStatus::Draft),
            "OPEN" => Ok(JobStatus::Open),
            "CLOSED" => Ok(JobStatus::Closed),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

/// A job joined with its owning company's name.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: JobStatus,
    pub created_by: Uuid,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Detail projection. `application_count` is only populated for the owner's listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: JobStatus,
    pub company_name: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_count: Option<i64>,
}

impl From<JobRow> for JobDto {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            status: row.status,
            company_name: row.company_name,
            company_id: row.created_by,
            created_at: row.created_at,
            application_count: None,
        }
    }
}

/// A job with the live number of applications it has received.
#[derive(Debug, Clone, FromRow)]
pub struct OwnedJobRow {
    #[sqlx(flatten)]
    pub job: JobRow,
    pub application_count: i64,
}

impl From<OwnedJobRow> for JobDto {
    fn from(row: OwnedJobRow) -> Self {
        Self {
            application_count: Some(row.application_count),
            ..JobDto::from(row.job)
        }
    }
}

/// List projection used by public search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: JobStatus,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for JobListDto {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            status: row.status,
            company_name: row.company_name,
            created_at: row.created_at,
        }
    }
}
