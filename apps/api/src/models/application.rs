use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::JobStatus;

/// Application status. Unlike `JobStatus` there is no transition graph:
/// the job owner may move an application from any status to any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "application_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Reviewed,
    Interview,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    /// Statuses the applicant is emailed about.
    pub fn notifies_applicant(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interview | ApplicationStatus::Rejected | ApplicationStatus::Hired
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Reviewed => "REVIEWED",
            ApplicationStatus::Interview => "INTERVIEW",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Hired => "HIRED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid application status: {s}"))
    }
}

/// An application joined with its applicant, job and the job's company.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_status: JobStatus,
    pub company_id: Uuid,
    pub company_name: String,
    pub company_email: String,
    pub resume_link: String,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full projection returned from apply and status updates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub resume_link: String,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ApplicationDto {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            applicant_id: row.applicant_id,
            applicant_name: row.applicant_name,
            job_id: row.job_id,
            job_title: row.job_title,
            company_name: row.company_name,
            resume_link: row.resume_link,
            cover_letter: row.cover_letter,
            status: row.status,
            applied_at: row.applied_at,
        }
    }
}

/// What an applicant sees when tracking their own applications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantApplicationDto {
    pub id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub status: ApplicationStatus,
    pub job_status: JobStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ApplicantApplicationDto {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            job_title: row.job_title,
            company_name: row.company_name,
            status: row.status,
            job_status: row.job_status,
            applied_at: row.applied_at,
        }
    }
}

/// What a company sees when reviewing applicants. No applicant identifier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyApplicationDto {
    pub id: Uuid,
    pub applicant_name: String,
    pub resume_link: String,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<ApplicationRow> for CompanyApplicationDto {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            applicant_name: row.applicant_name,
            resume_link: row.resume_link,
            cover_letter: row.cover_letter,
            status: row.status,
            applied_at: row.applied_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            applicant_name: "Jane Doe".into(),
            applicant_email: "jane@x.com".into(),
            job_id: Uuid::new_v4(),
            job_title: "Engineer".into(),
            job_status: JobStatus::Open,
            company_id: Uuid::new_v4(),
            company_name: "Acme Corp".into(),
            company_email: "hr@acme.com".into(),
            resume_link: "http://s3/resumes/a.pdf".into(),
            cover_letter: None,
            status: ApplicationStatus::Applied,
            applied_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_notification_statuses() {
        let notified: Vec<_> = ApplicationStatus::ALL
            .into_iter()
            .filter(|s| s.notifies_applicant())
            .collect();
        assert_eq!(
            notified,
            vec![
                ApplicationStatus::Interview,
                ApplicationStatus::Rejected,
                ApplicationStatus::Hired
            ]
        );
    }

    #[test]
    fn test_parse_status_case_insensitive() {
        assert_eq!(
            "interview".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Interview
        );
        assert!("ghosted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_company_projection_hides_applicant_identity() {
        let row = row();
        let applicant_id = row.applicant_id.to_string();
        let json = serde_json::to_string(&CompanyApplicationDto::from(row)).unwrap();
        assert!(!json.contains(&applicant_id));
        assert!(!json.contains("jane@x.com"));
        assert!(json.contains("Jane Doe"));
    }

    #[test]
    fn test_applicant_projection_carries_job_status() {
        let json = serde_json::to_value(ApplicantApplicationDto::from(row())).unwrap();
        assert_eq!(json["jobStatus"], "OPEN");
        assert_eq!(json["status"], "APPLIED");
    }
}
