use serde::Deserialize;
use uuid::Uuid;

use crate::models::application::ApplicationStatus;
use crate::models::job::JobStatus;
use crate::pagination::{non_blank, PageQuery, PageRequest};
use crate::storage::ResumeUpload;

pub const COVER_LETTER_MAX: usize = 200;

/// Fields collected from the multipart apply form.
#[derive(Debug, Default)]
pub struct ApplyForm {
    pub job_id: Option<String>,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeUpload>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume: ResumeUpload,
}

impl ApplyForm {
    /// Checks the form fields. File content rules are left to resume storage.
    pub fn validate(self) -> Result<NewApplication, Vec<String>> {
        let mut errors = Vec::new();

        let job_id = match non_blank(&self.job_id) {
            None => {
                errors.push("Job ID is required".to_string());
                None
            }
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(format!("Invalid job ID: {raw}"));
                    None
                }
            },
        };

        if self.resume.is_none() {
            errors.push("Resume file is required".to_string());
        }

        let cover_letter = non_blank(&self.cover_letter).map(str::to_string);
        if cover_letter
            .as_deref()
            .is_some_and(|c| c.chars().count() > COVER_LETTER_MAX)
        {
            errors.push(format!(
                "Cover letter must not exceed {COVER_LETTER_MAX} characters"
            ));
        }

        match (job_id, self.resume) {
            (Some(job_id), Some(resume)) if errors.is_empty() => Ok(NewApplication {
                job_id,
                cover_letter,
                resume,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    pub fn validate(&self) -> Result<ApplicationStatus, Vec<String>> {
        match non_blank(&self.status) {
            None => Err(vec!["Status is required".to_string()]),
            Some(raw) => raw.parse().map_err(|e| vec![e]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyApplicationsQuery {
    pub company_name: Option<String>,
    pub job_status: Option<String>,
    /// Comma-separated, e.g. `APPLIED,INTERVIEW`.
    pub application_statuses: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantFilters {
    pub company_name: Option<String>,
    pub job_status: Option<JobStatus>,
    pub statuses: Option<Vec<ApplicationStatus>>,
}

impl MyApplicationsQuery {
    pub fn validate(&self) -> Result<(ApplicantFilters, PageRequest), Vec<String>> {
        let mut errors = Vec::new();

        let job_status = match non_blank(&self.job_status).map(str::parse::<JobStatus>) {
            Some(Ok(status)) => Some(status),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => None,
        };

        let statuses = match non_blank(&self.application_statuses).map(parse_statuses) {
            Some(Ok(statuses)) if !statuses.is_empty() => Some(statuses),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            _ => None,
        };

        let page = self.page.validate().unwrap_or_else(|page_errors| {
            errors.extend(page_errors);
            PageRequest::default()
        });

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok((
            ApplicantFilters {
                company_name: non_blank(&self.company_name).map(str::to_string),
                job_status,
                statuses,
            },
            page,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JobApplicationsQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

impl JobApplicationsQuery {
    pub fn validate(&self) -> Result<(Option<ApplicationStatus>, PageRequest), Vec<String>> {
        let mut errors = Vec::new();

        let status = match non_blank(&self.status).map(str::parse::<ApplicationStatus>) {
            Some(Ok(status)) => Some(status),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => None,
        };
        let page = self.page.validate().unwrap_or_else(|page_errors| {
            errors.extend(page_errors);
            PageRequest::default()
        });

        if errors.is_empty() {
            Ok((status, page))
        } else {
            Err(errors)
        }
    }
}

/// Parses a comma-separated status list, skipping empty items.
pub fn parse_statuses(raw: &str) -> Result<Vec<ApplicationStatus>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
