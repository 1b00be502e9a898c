use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;

/// Discriminator carried by verification tokens.
pub const VERIFICATION_TOKEN_TYPE: &str = "verification";

/// Claims of the session bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User email.
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub role: Role,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Claims of the email-verification token. Has no `role`, so it can never
/// pass as a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub token_type: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and validates HS256 tokens for sessions and email verification.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    session_ttl: Duration,
    verification_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, session_ttl_secs: i64, verification_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl: Duration::seconds(session_ttl_secs),
            verification_ttl: Duration::seconds(verification_ttl_secs),
        }
    }

    pub fn issue_session(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;
        let claims = SessionClaims {
            sub: email.to_string(),
            user_id,
            role,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    /// Validates a bearer token. Expired tokens and every other failure are
    /// reported separately so clients know to log in again.
    pub fn decode_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        decode::<SessionClaims>(token, &self.decoding, &validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => {
                    debug!("Rejected bearer token: {e}");
                    AppError::Unauthorized
                }
            })
    }

    pub fn issue_verification(&self, user_id: Uuid, email: &str) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + self.verification_ttl;
        let claims = VerificationClaims {
            sub: email.to_string(),
            user_id,
            token_type: VERIFICATION_TOKEN_TYPE.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    /// Returns the claims only when signature, expiry and type all check out.
    pub fn validate_verification(&self, token: &str) -> Option<VerificationClaims> {
        match decode::<VerificationClaims>(token, &self.decoding, &validation()) {
            Ok(data) if data.claims.token_type == VERIFICATION_TOKEN_TYPE => Some(data.claims),
            Ok(_) => None,
            Err(e) => {
                debug!("Verification token failed validation: {e}");
                None
            }
        }
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn service() -> TokenService {
        TokenService::new(SECRET, 3600, 600)
    }

    #[test]
    fn test_session_round_trip_carries_identity() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let issued = svc.issue_session(user_id, "jane@x.com", Role::Applicant).unwrap();
        let claims = svc.decode_session(&issued.token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.sub, "jane@x.com");
        assert_eq!(claims.role, Role::Applicant);
    }

    #[test]
    fn test_expired_session_reports_token_expired() {
        let svc = TokenService::new(SECRET, -120, 600);
        let issued = svc.issue_session(Uuid::new_v4(), "a@b.com", Role::Company).unwrap();
        assert!(matches!(
            svc.decode_session(&issued.token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let issued = service()
            .issue_session(Uuid::new_v4(), "a@b.com", Role::Company)
            .unwrap();
        let other = TokenService::new("another-secret-entirely-different", 3600, 600);
        assert!(matches!(
            other.decode_session(&issued.token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_garbage_is_unauthorized() {
        assert!(matches!(
            service().decode_session("not.a.jwt"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_verification_token_is_not_a_session_token() {
        let svc = service();
        let issued = svc.issue_verification(Uuid::new_v4(), "a@b.com").unwrap();
        assert!(svc.decode_session(&issued.token).is_err());
    }

    #[test]
    fn test_session_token_is_not_a_verification_token() {
        let svc = service();
        let issued = svc
            .issue_session(Uuid::new_v4(), "a@b.com", Role::Applicant)
            .unwrap();
        assert!(svc.validate_verification(&issued.token).is_none());
    }

    #[test]
    fn test_verification_token_validates() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let issued = svc.issue_verification(user_id, "a@b.com").unwrap();
        let claims = svc.validate_verification(&issued.token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.token_type, VERIFICATION_TOKEN_TYPE);
    }

    #[test]
    fn test_expired_verification_token_rejected() {
        let svc = TokenService::new(SECRET, 3600, -120);
        let issued = svc.issue_verification(Uuid::new_v4(), "a@b.com").unwrap();
        assert!(svc.validate_verification(&issued.token).is_none());
    }

    #[test]
    fn test_reissued_verification_tokens_differ() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let first = svc.issue_verification(user_id, "a@b.com").unwrap();
        let second = svc.issue_verification(user_id, "a@b.com").unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_verification_expiry_is_shorter_than_session() {
        let svc = service();
        let session = svc
            .issue_session(Uuid::new_v4(), "a@b.com", Role::Applicant)
            .unwrap();
        let verification = svc.issue_verification(Uuid::new_v4(), "a@b.com").unwrap();
        assert!(verification.expires_at < session.expires_at);
    }
}
