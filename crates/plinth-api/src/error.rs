//! API error types.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use plinth_commons::CommonError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the dispatch pipeline and handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A path named a component the registry does not know. The registry is
    /// fully populated at startup, so this means a malformed or hostile
    /// route string, not a wiring bug.
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    /// Session or role store failure during dispatch.
    #[error("Store failure: {0}")]
    Store(#[from] CommonError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownComponent(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (code, message) = match self {
            ApiError::UnknownComponent(name) => {
                ("UNKNOWN_COMPONENT", format!("No component registered for '{name}'"))
            }
            ApiError::Store(_) => {
                // Detail stays in the log; the body is generic.
                log::error!("{}", self);
                ("STORE_FAILURE", "Internal error".to_string())
            }
        };
        HttpResponse::build(self.status_code()).json(json!({
            "error": code,
            "message": message,
        }))
    }
}
