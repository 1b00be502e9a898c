use serde::Serialize;

use crate::pagination::Page;

/// Envelope wrapping every JSON response, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub object: Option<T>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, object: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            object: Some(object),
            errors: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            object: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            object: None,
            errors: Some(errors),
        }
    }
}

/// Envelope for list endpoints. `page_number` is 1-based.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub message: String,
    pub object: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_size: i64,
    pub errors: Option<Vec<String>>,
}

impl<T> PaginatedResponse<T> {
    pub fn success(message: impl Into<String>, page: Page<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            object: page.items,
            page_number: page.page_number,
            page_size: page.page_size,
            total_size: page.total,
            errors: None,
        }
    }
}
