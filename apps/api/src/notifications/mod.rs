//! Fire-and-forget email notifications.
//!
//! Every dispatch runs on its own spawned task. Delivery failures are logged
//! and never reach the business operation that triggered them.

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::application::ApplicationStatus;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
}

/// Delivery backend. `Notifier` carries an `Arc<dyn Mailer>` so SMTP, logging
/// and test recorders are interchangeable.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, base_url: impl Into<String>) -> Self {
        Self {
            mailer,
            base_url: base_url.into(),
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/api/auth/verify-email?token={}", self.base_url, token)
    }

    pub fn send_verification(&self, to: &str, name: &str, token: &str) -> JoinHandle<()> {
        let link = self.verification_link(token);
        self.dispatch(templates::verification(to, name, &link))
    }

    pub fn send_new_application(
        &self,
        company_email: &str,
        company_name: &str,
        job_title: &str,
        applicant_name: &str,
    ) -> JoinHandle<()> {
        self.dispatch(templates::new_application(
            company_email,
            company_name,
            job_title,
            applicant_name,
            &self.base_url,
        ))
    }

    /// Emails the applicant about a status change. Returns `None` for statuses
    /// that do not notify.
    pub fn send_status_update(
        &self,
        applicant_email: &str,
        applicant_name: &str,
        job_title: &str,
        company_name: &str,
        status: ApplicationStatus,
    ) -> Option<JoinHandle<()>> {
        if !status.notifies_applicant() {
            return None;
        }
        Some(self.dispatch(templates::status_update(
            applicant_email,
            applicant_name,
            job_title,
            company_name,
            status,
            &self.base_url,
        )))
    }

    fn dispatch(&self, email: Email) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            match mailer.send(&email).await {
                Ok(()) => info!("Email '{}' sent to {}", email.subject, email.to),
                Err(e) => error!("Failed to send email '{}' to {}: {e:#}", email.subject, email.to),
            }
        })
    }
}
