use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// Authenticated caller resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied".to_string()))
        }
    }
}

/// Pulls the token out of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = bearer_token(header).ok_or(AppError::Unauthorized)?;
        let claims = state.tokens.decode_session(token)?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
            role: claims.role,
        })
    }
}

/// Caller holding the COMPANY role. Rejects with 403 otherwise.
#[derive(Debug, Clone)]
pub struct CompanyUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for CompanyUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_role(Role::Company)?;
        Ok(CompanyUser(user))
    }
}

/// Caller holding the APPLICANT role. Rejects with 403 otherwise.
#[derive(Debug, Clone)]
pub struct ApplicantUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for ApplicantUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_role(Role::Applicant)?;
        Ok(ApplicantUser(user))
    }
}
