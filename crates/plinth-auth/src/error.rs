//! Auth error types.

use thiserror::Error;

/// Errors produced by the auth utilities.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Password hashing error: {0}")]
    HashingError(String),

    #[error("Password validation error: {0}")]
    InvalidPassword(String),
}

/// Result type for auth operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
