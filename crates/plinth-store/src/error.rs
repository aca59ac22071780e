//! Store error types.

use thiserror::Error;

/// Errors produced by the storage layer.
///
/// Database failures collapse into a single `OperationFailed` kind carrying
/// the failing model name, the operation, and the best available detail —
/// the shape the bootstrap CLI reports on stderr.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{model}.{operation} failed: {detail}")]
    OperationFailed {
        model: String,
        operation: String,
        detail: String,
    },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Unsupported database type: {0}")]
    UnsupportedType(String),
}

impl StoreError {
    /// Wrap a low-level error under a model/operation pair.
    pub fn operation(
        model: impl Into<String>,
        operation: impl Into<String>,
        detail: impl ToString,
    ) -> Self {
        Self::OperationFailed {
            model: model.into(),
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Extension trait for sqlx results: attach the model/operation context the
/// error contract requires.
pub trait SqlResultExt<T> {
    fn op_context(self, model: &str, operation: &str) -> Result<T>;
}

impl<T> SqlResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn op_context(self, model: &str, operation: &str) -> Result<T> {
        self.map_err(|e| StoreError::operation(model, operation, e))
    }
}

impl From<StoreError> for plinth_commons::CommonError {
    fn from(err: StoreError) -> Self {
        plinth_commons::CommonError::Internal(err.to_string())
    }
}
