use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Namespace every resume key lives under.
pub const KEY_PREFIX: &str = "resumes/";

const PDF_CONTENT_TYPE: &str = "application/pdf";
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Pdf,
    Docx,
}

impl ResumeKind {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            Some(ResumeKind::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_CONTENT_TYPE) {
            Some(ResumeKind::Docx)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ResumeKind::Pdf => PDF_CONTENT_TYPE,
            ResumeKind::Docx => DOCX_CONTENT_TYPE,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ResumeKind::Pdf => "pdf",
            ResumeKind::Docx => "docx",
        }
    }
}

/// A resume file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ResumeUpload {
    pub fn validate(&self) -> Result<ResumeKind, AppError> {
        if self.data.is_empty() {
            return Err(invalid("Resume file is required"));
        }
        if self.data.len() > MAX_RESUME_BYTES {
            return Err(invalid("File size must not exceed 5MB"));
        }

        let kind = self
            .content_type
            .as_deref()
            .and_then(ResumeKind::from_content_type)
            .ok_or_else(|| invalid("Only PDF and DOCX files are allowed"))?;

        let file_name = self
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| invalid("Invalid file name"))?;

        match extension(file_name) {
            Some(ext) if ext.eq_ignore_ascii_case(kind.extension()) => Ok(kind),
            _ => Err(invalid("File extension does not match file type")),
        }
    }
}

fn invalid(msg: &str) -> AppError {
    AppError::Validation(msg.to_string())
}

fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Fresh collision-free key for a resume of the given kind.
pub fn object_key(kind: ResumeKind) -> String {
    format!("{KEY_PREFIX}{}.{}", Uuid::new_v4(), kind.extension())
}

/// Recovers the storage key from a public resume URL.
pub fn key_from_url(url: &str) -> Option<&str> {
    let start = url.rfind(KEY_PREFIX)?;
    let key = &url[start..];
    (key.len() > KEY_PREFIX.len()).then_some(key)
}
