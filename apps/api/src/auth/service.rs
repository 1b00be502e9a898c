use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{self, hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::auth::validation::{ValidLogin, ValidSignup};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::user::{LoginResponse, UserRow};
use crate::notifications::Notifier;

const EMAIL_TAKEN: &str = "Email already exists";

/// What a verification attempt resolves to once the token holder is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    MarkVerified,
    /// Token is no longer valid but its holder is still unverified: a new
    /// link is issued and the caller is told the old one expired.
    Reissue,
    AlreadyVerified,
    Invalid,
}

/// `valid_for` is the user id from a token that passed signature, expiry and
/// type checks, or `None` when it did not.
pub fn decide_verification(
    valid_for: Option<Uuid>,
    holder_id: Uuid,
    holder_verified: bool,
) -> VerificationOutcome {
    if holder_verified {
        return VerificationOutcome::AlreadyVerified;
    }
    match valid_for {
        None => VerificationOutcome::Reissue,
        Some(user_id) if user_id == holder_id => VerificationOutcome::MarkVerified,
        Some(_) => VerificationOutcome::Invalid,
    }
}

/// Registers an unverified user and emails a verification link.
pub async fn signup(
    pool: &PgPool,
    tokens: &TokenService,
    notifier: &Notifier,
    req: ValidSignup,
) -> Result<UserRow, AppError> {
    info!("Signup requested for {} as {}", req.email, req.role);

    let password = req.password;
    let password_hash = password::blocking(move || hash_password(&password)).await??;

    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&req.email)
        .fetch_one(&mut *tx)
        .await?;
    if exists {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let id = Uuid::new_v4();
    let verification = tokens.issue_verification(id, &req.email)?;

    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users
            (id, name, email, password_hash, role, is_verified,
             verification_token, verification_token_expires_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(req.role)
    .bind(&verification.token)
    .bind(verification.expires_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, Some("users_email_key")) {
            AppError::Conflict(EMAIL_TAKEN.to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    tx.commit().await?;

    notifier.send_verification(&user.email, &user.name, &verification.token);
    info!("User {} registered; verification email queued", user.id);
    Ok(user)
}

/// Consumes a verification token.
///
/// An expired (or otherwise invalid) token still held by an unverified user
/// triggers a fresh verification email, and the call then fails with
/// `VerificationExpired` so the client can tell the user to check their inbox.
pub async fn verify_email(
    pool: &PgPool,
    tokens: &TokenService,
    notifier: &Notifier,
    token: &str,
) -> Result<(), AppError> {
    let valid_for = tokens.validate_verification(token).map(|claims| claims.user_id);

    let mut tx = pool.begin().await?;

    let holder: Option<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE verification_token = $1 FOR UPDATE")
            .bind(token)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(user) = holder else {
        return Err(AppError::InvalidToken);
    };

    match decide_verification(valid_for, user.id, user.is_verified) {
        VerificationOutcome::MarkVerified => {
            sqlx::query(
                r#"
                UPDATE users
                SET is_verified = TRUE,
                    verification_token = NULL,
                    verification_token_expires_at = NULL,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            info!("User {} verified their email", user.id);
            Ok(())
        }
        VerificationOutcome::Reissue => {
            let fresh = tokens.issue_verification(user.id, &user.email)?;
            sqlx::query(
                r#"
                UPDATE users
                SET verification_token = $2,
                    verification_token_expires_at = $3,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(user.id)
            .bind(&fresh.token)
            .bind(fresh.expires_at)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            notifier.send_verification(&user.email, &user.name, &fresh.token);
            warn!("Expired verification token for user {}; new link sent", user.id);
            Err(AppError::VerificationExpired)
        }
        VerificationOutcome::AlreadyVerified => Err(AppError::AlreadyVerified),
        VerificationOutcome::Invalid => Err(AppError::InvalidToken),
    }
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    pool: &PgPool,
    tokens: &TokenService,
    req: ValidLogin,
) -> Result<LoginResponse, AppError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(pool)
        .await?;
    let Some(user) = user else {
        return Err(AppError::InvalidCredentials);
    };

    let password = req.password;
    let stored = user.password_hash.clone();
    if !password::blocking(move || verify_password(&password, &stored)).await? {
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_verified {
        return Err(AppError::EmailNotVerified);
    }

    let session = tokens.issue_session(user.id, &user.email, user.role)?;
    info!("User {} logged in", user.id);

    Ok(LoginResponse {
        token: session.token,
        user_id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

pub async fn current_user(pool: &PgPool, user_id: Uuid) -> Result<UserRow, AppError> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Deletes unverified accounts whose verification window has closed.
/// Returns the number of accounts removed.
pub async fn cleanup_expired_users(pool: &PgPool) -> Result<u64, AppError> {
    let result = sqlx::query(
        "DELETE FROM users WHERE is_verified = FALSE AND verification_token_expires_at < NOW()",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
