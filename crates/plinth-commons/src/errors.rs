//! Common error type shared across Plinth crates.

use thiserror::Error;

/// Errors produced by the shared building blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for shared operations.
pub type Result<T> = std::result::Result<T, CommonError>;
