pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::storage::MAX_RESUME_BYTES;

/// Multipart ceiling for the apply form. Above the resume limit so an
/// oversize file still reaches resume validation.
const APPLY_BODY_LIMIT: usize = 2 * MAX_RESUME_BYTES;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route("/api/auth/signup", post(auth::handle_signup))
        .route("/api/auth/verify-email", get(auth::handle_verify_email))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/me", get(auth::handle_me))
        // Jobs
        .route("/api/jobs", post(jobs::handle_create_job))
        .route("/api/jobs/search", get(jobs::handle_search_jobs))
        .route("/api/jobs/my-jobs", get(jobs::handle_my_jobs))
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        // Applications
        .route(
            "/api/applications",
            post(applications::handle_apply).layer(DefaultBodyLimit::max(APPLY_BODY_LIMIT)),
        )
        .route(
            "/api/applications/my-applications",
            get(applications::handle_my_applications),
        )
        .route(
            "/api/applications/job/:job_id",
            get(applications::handle_job_applications),
        )
        .route(
            "/api/applications/:id/status",
            put(applications::handle_update_status),
        )
        .with_state(state)
}
