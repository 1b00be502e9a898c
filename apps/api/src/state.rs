use sqlx::PgPool;

use crate::auth::TokenService;
use crate::notifications::Notifier;
use crate::storage::ResumeStorage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenService,
    /// Fire-and-forget email dispatch. SMTP when configured, log-only otherwise.
    pub notifier: Notifier,
    pub resumes: ResumeStorage,
}
