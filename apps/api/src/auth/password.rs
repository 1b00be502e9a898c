use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::AppError;

/// Hashes a password with Argon2id into a PHC string.
/// CPU-bound: call from `spawn_blocking` on request paths.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// False for a mismatch and for an unparseable stored hash alike.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Runs a blocking credential operation off the async executor.
pub async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("P@ssw0rd1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("P@ssw0rd1", &hash));
        assert!(!verify_password("P@ssw0rd2", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(
            hash_password("P@ssw0rd1").unwrap(),
            hash_password("P@ssw0rd1").unwrap()
        );
    }

    #[test]
    fn test_malformed_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "plaintext"));
    }

    #[tokio::test]
    async fn test_blocking_returns_value() {
        let verified = blocking(|| 2 + 2).await.unwrap();
        assert_eq!(verified, 4);
    }
}
