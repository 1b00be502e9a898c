//! Page and sort parameters shared by every list endpoint.
//!
//! Page numbers are 1-based at the HTTP boundary and converted to a row offset
//! here. Sort fields are never interpolated from user input: each endpoint
//! supplies an allow-list mapping public field names to SQL columns.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction: {other}")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Raw page/sort query parameters. Kept as strings so malformed values are
/// reported through the validation envelope instead of a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(alias = "page")]
    pub page_number: Option<String>,
    #[serde(alias = "size")]
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    #[serde(alias = "sortDir")]
    pub sort_direction: Option<String>,
}

/// Validated page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_direction: None,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page_number - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl PageQuery {
    /// Validates every field, collecting all problems before failing.
    pub fn validate(&self) -> Result<PageRequest, Vec<String>> {
        let mut errors = Vec::new();
        let mut request = PageRequest::default();

        if let Some(raw) = non_blank(&self.page_number) {
            match raw.parse::<u32>() {
                Ok(n) if n >= 1 => request.page_number = n,
                _ => errors.push("Page number must be at least 1".to_string()),
            }
        }

        if let Some(raw) = non_blank(&self.page_size) {
            match raw.parse::<u32>() {
                Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => request.page_size = n,
                _ => errors.push(format!("Page size must be between 1 and {MAX_PAGE_SIZE}")),
            }
        }

        if let Some(raw) = non_blank(&self.sort_direction) {
            match raw.parse::<SortDirection>() {
                Ok(direction) => request.sort_direction = Some(direction),
                Err(e) => errors.push(e),
            }
        }

        request.sort_by = non_blank(&self.sort_by).map(str::to_string);

        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors)
        }
    }
}

/// Treats an absent or whitespace-only parameter as not provided.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Resolved ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl Sort {
    pub const fn new(column: &'static str, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// ORDER BY body with a stable tiebreaker so pages never overlap.
    pub fn to_sql(&self, tiebreaker: &str) -> String {
        format!("{} {}, {} ASC", self.column, self.direction.as_sql(), tiebreaker)
    }
}

/// Per-endpoint sorting rules.
pub struct SortRules {
    /// Public field name → SQL column.
    pub allowed: &'static [(&'static str, &'static str)],
    /// Used when no `sortBy` is provided.
    pub default: Sort,
    /// Direction applied when `sortBy` is provided without a direction.
    pub explicit_direction: SortDirection,
}

impl SortRules {
    pub fn resolve(&self, request: &PageRequest) -> Result<Sort, AppError> {
        let Some(field) = request.sort_by.as_deref() else {
            return Ok(Sort {
                direction: request.sort_direction.unwrap_or(self.default.direction),
                ..self.default
            });
        };

        let column = self
            .allowed
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, column)| *column)
            .ok_or_else(|| {
                let names: Vec<_> = self.allowed.iter().map(|(name, _)| *name).collect();
                AppError::Validation(format!(
                    "Invalid sort field '{field}'. Allowed: {}",
                    names.join(", ")
                ))
            })?;

        Ok(Sort::new(
            column,
            request.sort_direction.unwrap_or(self.explicit_direction),
        ))
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
        Self {
            items,
            page_number: request.page_number,
            page_size: request.page_size,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: SortRules = SortRules {
        allowed: &[("title", "j.title"), ("createdAt", "j.created_at")],
        default: Sort::new("j.created_at", SortDirection::Desc),
        explicit_direction: SortDirection::Asc,
    };

    fn query(page: Option<&str>, size: Option<&str>) -> PageQuery {
        PageQuery {
            page_number: page.map(String::from),
            page_size: size.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let req = PageQuery::default().validate().unwrap();
        assert_eq!(req.page_number, 1);
        assert_eq!(req.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_one_based_page_becomes_zero_based_offset() {
        let req = query(Some("3"), Some("20")).validate().unwrap();
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut q = query(Some("0"), Some("abc"));
        q.sort_direction = Some("sideways".into());
        let errors = q.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_page_size_upper_bound() {
        assert!(query(None, Some("101")).validate().is_err());
        assert!(query(None, Some("100")).validate().is_ok());
    }

    #[test]
    fn test_sort_direction_case_insensitive() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(" asc ".parse::<SortDirection>().unwrap(), SortDirection::Asc);
    }

    #[test]
    fn test_default_sort_when_no_sort_by() {
        let sort = RULES.resolve(&PageRequest::default()).unwrap();
        assert_eq!(sort, Sort::new("j.created_at", SortDirection::Desc));
    }

    #[test]
    fn test_explicit_sort_uses_endpoint_direction() {
        let req = PageRequest {
            sort_by: Some("TITLE".into()),
            ..Default::default()
        };
        assert_eq!(
            RULES.resolve(&req).unwrap(),
            Sort::new("j.title", SortDirection::Asc)
        );
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let req = PageRequest {
            sort_by: Some("password; DROP TABLE users".into()),
            ..Default::default()
        };
        assert!(matches!(RULES.resolve(&req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_order_by_has_tiebreaker() {
        let sql = Sort::new("j.title", SortDirection::Desc).to_sql("j.id");
        assert_eq!(sql, "j.title DESC, j.id ASC");
    }
}
