use serde::Deserialize;

use crate::models::job::JobStatus;
use crate::pagination::{non_blank, PageQuery};

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 2000;

const TITLE_LENGTH: &str = "Job title must be between 1 and 100 characters";
const DESCRIPTION_LENGTH: &str = "Job description must be between 20 and 2000 characters";

#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: JobStatus,
}

/// Partial update: absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the location; a blank value in the request does the same.
    pub location: Option<Option<String>>,
    pub status: Option<JobStatus>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchQuery {
    pub title: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyJobsQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Case-insensitive substring filters. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub title: Option<String>,
    pub location: Option<String>,
    pub company_name: Option<String>,
}

impl JobSearchQuery {
    pub fn filters(&self) -> JobFilters {
        JobFilters {
            title: non_blank(&self.title).map(str::to_string),
            location: non_blank(&self.location).map(str::to_string),
            company_name: non_blank(&self.company_name).map(str::to_string),
        }
    }
}

impl MyJobsQuery {
    pub fn status(&self) -> Result<Option<JobStatus>, String> {
        non_blank(&self.status)
            .map(str::parse::<JobStatus>)
            .transpose()
    }
}

fn check_title(title: &str, errors: &mut Vec<String>) {
    if title.chars().count() > TITLE_MAX {
        errors.push(TITLE_LENGTH.to_string());
    }
}

fn check_description(description: &str, errors: &mut Vec<String>) {
    let len = description.chars().count();
    if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&len) {
        errors.push(DESCRIPTION_LENGTH.to_string());
    }
}

fn parse_status(raw: Option<&str>, errors: &mut Vec<String>) -> Option<JobStatus> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

impl CreateJobRequest {
    pub fn validate(&self) -> Result<NewJob, Vec<String>> {
        let mut errors = Vec::new();

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            errors.push("Job title is required".to_string());
        } else {
            check_title(title, &mut errors);
        }

        let description = self.description.as_deref().map(str::trim).unwrap_or_default();
        if description.is_empty() {
            errors.push("Job description is required".to_string());
        } else {
            check_description(description, &mut errors);
        }

        let status = parse_status(self.status.as_deref(), &mut errors).unwrap_or_default();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewJob {
            title: title.to_string(),
            description: description.to_string(),
            location: non_blank(&self.location).map(str::to_string),
            status,
        })
    }
}

impl UpdateJobRequest {
    pub fn validate(&self) -> Result<JobPatch, Vec<String>> {
        let mut errors = Vec::new();

        let title = self.title.as_deref().map(str::trim);
        match title {
            Some("") => errors.push(TITLE_LENGTH.to_string()),
            Some(title) => check_title(title, &mut errors),
            None => {}
        }

        let description = self.description.as_deref().map(str::trim);
        if let Some(description) = description {
            check_description(description, &mut errors);
        }

        let status = parse_status(self.status.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(JobPatch {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
            location: self
                .location
                .as_ref()
                .map(|_| non_blank(&self.location).map(str::to_string)),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, description: &str) -> CreateJobRequest {
        CreateJobRequest {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_defaults_to_draft() {
        let job = create("Engineer", "Build and operate backend services.")
            .validate()
            .unwrap();
        assert_eq!(job.status, JobStatus::Draft);
        assert_eq!(job.location, None);
    }

    #[test]
    fn test_create_length_bounds() {
        assert!(create(&"x".repeat(100), &"d".repeat(20)).validate().is_ok());
        assert!(create("Engineer", &"d".repeat(2000)).validate().is_ok());

        let errors = create(&"x".repeat(101), &"d".repeat(19)).validate().unwrap_err();
        assert_eq!(errors, vec![TITLE_LENGTH, DESCRIPTION_LENGTH]);
        assert!(create("Engineer", &"d".repeat(2001)).validate().is_err());
    }

    #[test]
    fn test_create_missing_fields_aggregate() {
        let errors = CreateJobRequest::default().validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["Job title is required", "Job description is required"]
        );
    }

    #[test]
    fn test_create_rejects_unknown_status() {
        let mut req = create("Engineer", "Build and operate backend services.");
        req.status = Some("ARCHIVED".into());
        assert_eq!(req.validate().unwrap_err(), vec!["Invalid job status: ARCHIVED"]);
    }

    #[test]
    fn test_empty_patch_is_valid() {
        let patch = UpdateJobRequest::default().validate().unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_checks_only_provided_fields() {
        let patch = UpdateJobRequest {
            status: Some("open".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.status, Some(JobStatus::Open));
        assert_eq!(patch.title, None);

        let errors = UpdateJobRequest {
            title: Some("  ".into()),
            description: Some("too short".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_blank_patch_location_clears_like_create() {
        let patch = UpdateJobRequest {
            location: Some("   ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.location, Some(None));
        assert!(!patch.is_empty());

        let patch = UpdateJobRequest {
            location: Some(" Nairobi ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.location, Some(Some("Nairobi".to_string())));
    }

    #[test]
    fn test_blank_search_filters_are_ignored() {
        let query = JobSearchQuery {
            title: Some("  ".into()),
            company_name: Some("Acme".into()),
            ..Default::default()
        };
        let filters = query.filters();
        assert_eq!(filters.title, None);
        assert_eq!(filters.company_name.as_deref(), Some("Acme"));
    }
}
