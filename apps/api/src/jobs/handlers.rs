use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::auth::CompanyUser;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::jobs::service;
use crate::jobs::validation::{CreateJobRequest, JobSearchQuery, MyJobsQuery, UpdateJobRequest};
use crate::models::job::{JobDto, JobListDto};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::state::AppState;

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    CompanyUser(user): CompanyUser,
    AppJson(req): AppJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobDto>>), AppError> {
    let job = req.validate().map_err(AppError::ValidationFailed)?;
    let row = service::create_job(&state.db, user.user_id, job).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created successfully", row.into())),
    ))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    CompanyUser(user): CompanyUser,
    AppPath(job_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateJobRequest>,
) -> Result<Json<ApiResponse<JobDto>>, AppError> {
    let patch = req.validate().map_err(AppError::ValidationFailed)?;
    let row = service::update_job(&state.db, job_id, user.user_id, patch).await?;
    Ok(Json(ApiResponse::success("Job updated successfully", row.into())))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    CompanyUser(user): CompanyUser,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    service::delete_job(&state.db, &state.resumes, job_id, user.user_id).await?;
    Ok(Json(ApiResponse::message("Job deleted successfully")))
}

/// GET /api/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<JobSearchQuery>,
) -> Result<Json<PaginatedResponse<JobListDto>>, AppError> {
    let page = query.page.validate().map_err(AppError::ValidationFailed)?;
    let jobs = service::search_jobs(&state.db, &query.filters(), &page).await?;
    Ok(Json(PaginatedResponse::success(
        "Jobs retrieved successfully",
        jobs.map(JobListDto::from),
    )))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<JobDto>>, AppError> {
    let row = service::get_job(&state.db, job_id).await?;
    Ok(Json(ApiResponse::success(
        "Job details retrieved successfully",
        row.into(),
    )))
}

/// GET /api/jobs/my-jobs
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    CompanyUser(user): CompanyUser,
    AppQuery(query): AppQuery<MyJobsQuery>,
) -> Result<Json<PaginatedResponse<JobDto>>, AppError> {
    let mut errors = Vec::new();
    let status = query.status().unwrap_or_else(|e| {
        errors.push(e);
        None
    });
    let page = match query.page.validate() {
        Ok(page) if errors.is_empty() => page,
        Ok(_) => return Err(AppError::ValidationFailed(errors)),
        Err(page_errors) => {
            errors.extend(page_errors);
            return Err(AppError::ValidationFailed(errors));
        }
    };

    let jobs = service::list_owner_jobs(&state.db, user.user_id, status, &page).await?;
    Ok(Json(PaginatedResponse::success(
        "Company jobs retrieved successfully",
        jobs.map(JobDto::from),
    )))
}
