use axum::extract::Multipart;
use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::applications::service;
use crate::applications::validation::{
    ApplyForm, JobApplicationsQuery, MyApplicationsQuery, UpdateStatusRequest,
};
use crate::auth::{ApplicantUser, CompanyUser};
use crate::errors::AppError;
use crate::extract::{AppJson, AppMultipart, AppPath, AppQuery};
use crate::models::application::{
    ApplicantApplicationDto, ApplicationDto, CompanyApplicationDto,
};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::state::AppState;
use crate::storage::ResumeUpload;

/// Reads `jobId`, `resume` and `coverLetter` from the form. Unknown fields are skipped.
async fn read_apply_form(mut multipart: Multipart) -> Result<ApplyForm, AppError> {
    let mut form = ApplyForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobId" => form.job_id = Some(field.text().await?),
            "coverLetter" => form.cover_letter = Some(field.text().await?),
            "resume" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                form.resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/applications (multipart)
pub async fn handle_apply(
    State(state): State<AppState>,
    ApplicantUser(user): ApplicantUser,
    AppMultipart(multipart): AppMultipart,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationDto>>), AppError> {
    let form = read_apply_form(multipart).await?;
    let application = form.validate().map_err(AppError::ValidationFailed)?;
    let row = service::apply(
        &state.db,
        &state.resumes,
        &state.notifier,
        user.user_id,
        application,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Application submitted successfully",
            row.into(),
        )),
    ))
}

/// GET /api/applications/my-applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    ApplicantUser(user): ApplicantUser,
    AppQuery(query): AppQuery<MyApplicationsQuery>,
) -> Result<Json<PaginatedResponse<ApplicantApplicationDto>>, AppError> {
    let (filters, page) = query.validate().map_err(AppError::ValidationFailed)?;
    let applications =
        service::list_for_applicant(&state.db, user.user_id, &filters, &page).await?;
    Ok(Json(PaginatedResponse::success(
        "Applications retrieved successfully",
        applications.map(ApplicantApplicationDto::from),
    )))
}

/// GET /api/applications/job/:job_id
pub async fn handle_job_applications(
    State(state): State<AppState>,
    CompanyUser(user): CompanyUser,
    AppPath(job_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<JobApplicationsQuery>,
) -> Result<Json<PaginatedResponse<CompanyApplicationDto>>, AppError> {
    let (status, page) = query.validate().map_err(AppError::ValidationFailed)?;
    let applications =
        service::list_for_job(&state.db, job_id, user.user_id, status, &page).await?;
    Ok(Json(PaginatedResponse::success(
        "Job applications retrieved successfully",
        applications.map(CompanyApplicationDto::from),
    )))
}

/// PUT /api/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    CompanyUser(user): CompanyUser,
    AppPath(application_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ApplicationDto>>, AppError> {
    let status = req.validate().map_err(AppError::ValidationFailed)?;
    let row = service::update_status(
        &state.db,
        &state.notifier,
        application_id,
        user.user_id,
        status,
    )
    .await?;
    Ok(Json(ApiResponse::success(
        "Application status updated successfully",
        row.into(),
    )))
}
