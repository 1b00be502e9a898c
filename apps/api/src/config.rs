use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub base_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
    pub jwt_verification_expiration_secs: i64,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    pub mail_from_name: String,
    pub cleanup_interval_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

/// SMTP relay settings. Absent when `SMTP_HOST` is unset.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let s3_bucket = require_env("S3_BUCKET")?;
        let s3_public_url = std::env::var("S3_PUBLIC_URL").unwrap_or_else(|_| {
            format!("{}/{}", s3_endpoint.trim_end_matches('/'), s3_bucket)
        });

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => Some(SmtpConfig {
                host,
                port: parse_env("SMTP_PORT", 587)?,
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            }),
            _ => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expiration_secs: parse_env("JWT_EXPIRATION_SECS", 86_400)?,
            jwt_verification_expiration_secs: parse_env("JWT_VERIFICATION_EXPIRATION_SECS", 3_600)?,
            s3_bucket,
            s3_endpoint,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_public_url: s3_public_url.trim_end_matches('/').to_string(),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            smtp,
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@jobboard.local".to_string()),
            mail_from_name: std::env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Job Board".to_string()),
            cleanup_interval_secs: non_zero(
                "CLEANUP_INTERVAL_SECS",
                parse_env("CLEANUP_INTERVAL_SECS", 3_600)?,
            )?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

/// Tokio intervals panic on a zero period.
fn non_zero(key: &str, value: u64) -> Result<u64> {
    if value == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(value)
}
