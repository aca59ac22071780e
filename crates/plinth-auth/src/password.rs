//! Password hashing and validation.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AuthError, AuthResult};

/// Bcrypt cost factor for password hashing.
pub const BCRYPT_COST: u32 = DEFAULT_COST;

/// Maximum password length (bcrypt has a 72-byte limit).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password using bcrypt.
///
/// Runs on the blocking thread pool: bcrypt is CPU-intensive and must not
/// stall the async runtime.
pub async fn hash_password(password: &str, cost: Option<u32>) -> AuthResult<String> {
    validate_password(password)?;
    let password = password.to_string();
    let cost = cost.unwrap_or(BCRYPT_COST);

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AuthError::HashingError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashingError(format!("Task join error: {}", e)))?
}

/// Verify a password against a bcrypt hash, on the blocking pool.
pub async fn verify_password(password: &str, hashed: &str) -> AuthResult<bool> {
    let password = password.to_string();
    let hashed = hashed.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &hashed).map_err(|e| AuthError::HashingError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashingError(format!("Task join error: {}", e)))?
}

/// Validate password shape before hashing.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.trim().is_empty() {
        return Err(AuthError::InvalidPassword("password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidPassword(format!(
            "password cannot exceed {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        // Low cost keeps the test fast; production uses BCRYPT_COST.
        let hashed = hash_password("correct horse", Some(4)).await.unwrap();
        assert!(verify_password("correct horse", &hashed).await.unwrap());
        assert!(!verify_password("wrong pony", &hashed).await.unwrap());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(validate_password("").is_err());
        assert!(validate_password("   ").is_err());
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(validate_password(&long).is_err());
    }
}
