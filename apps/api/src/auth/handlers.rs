use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::service;
use crate::auth::validation::{LoginRequest, SignupRequest};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::models::user::{LoginResponse, UserDto};
use crate::pagination::non_blank;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), AppError> {
    let valid = req.validate().map_err(AppError::ValidationFailed)?;
    let user = service::signup(&state.db, &state.tokens, &state.notifier, valid).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User registered successfully. Please check your email for verification link.",
            user.into(),
        )),
    ))
}

/// GET /api/auth/verify-email?token=
pub async fn handle_verify_email(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VerifyEmailQuery>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let token = non_blank(&query.token)
        .ok_or_else(|| AppError::Validation("Verification token is required".to_string()))?;
    service::verify_email(&state.db, &state.tokens, &state.notifier, token).await?;
    Ok(Json(ApiResponse::message(
        "Email verified successfully. You can now log in.",
    )))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let valid = req.validate().map_err(AppError::ValidationFailed)?;
    let login = service::login(&state.db, &state.tokens, valid).await?;
    Ok(Json(ApiResponse::success("Login successful", login)))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserDto>>, AppError> {
    let row = service::current_user(&state.db, user.user_id).await?;
    Ok(Json(ApiResponse::success(
        "User information retrieved successfully",
        row.into(),
    )))
}
