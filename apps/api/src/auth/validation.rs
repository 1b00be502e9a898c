//! Field-level checks for auth payloads. Every check runs; failures are
//! returned together rather than stopping at the first one.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::models::user::Role;

pub const MIN_PASSWORD_LEN: usize = 8;

fn full_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+ [A-Za-z]+$").expect("valid full-name regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("valid email regex")
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

/// Trims and lower-cases an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn is_full_name(name: &str) -> bool {
    full_name_regex().is_match(name.trim())
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Problems with a password, empty when it is acceptable.
pub fn password_problems(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        problems.push("Password must contain at least one special character".to_string());
    }
    problems
}

impl SignupRequest {
    pub fn validate(&self) -> Result<ValidSignup, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.push("Name is required".to_string());
        } else if !is_full_name(name) {
            errors.push(
                "Name must be a full name: first and last name separated by a single space"
                    .to_string(),
            );
        }

        let email = self.email.as_deref().map(normalize_email).unwrap_or_default();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !is_valid_email(&email) {
            errors.push("Please provide a valid email address".to_string());
        }

        let password = self.password.clone().unwrap_or_default();
        if password.is_empty() {
            errors.push("Password is required".to_string());
        } else {
            errors.extend(password_problems(&password));
        }

        let role = match self.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => {
                errors.push("Role is required".to_string());
                None
            }
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
        };

        match role {
            Some(role) if errors.is_empty() => Ok(ValidSignup {
                name: name.to_string(),
                email,
                password,
                role,
            }),
            _ => Err(errors),
        }
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<ValidLogin, Vec<String>> {
        let mut errors = Vec::new();

        let email = self.email.as_deref().map(normalize_email).unwrap_or_default();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        }
        let password = self.password.clone().unwrap_or_default();
        if password.is_empty() {
            errors.push("Password is required".to_string());
        }

        if errors.is_empty() {
            Ok(ValidLogin { email, password })
        } else {
            Err(errors)
        }
    }
}
