//! Store traits the session layer depends on.
//!
//! Implemented by `plinth-store` against SQL databases; test code supplies
//! in-memory fakes. Failures propagate — the projection is never built from
//! partial data.

use async_trait::async_trait;
use plinth_commons::CommonError;
use serde_json::Value;

/// Backing store for session rows.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the properties map for a live (non-expired) session.
    async fn get_properties(&self, session_id: &str) -> Result<Option<Value>, CommonError>;

    /// Create a fresh, empty session row.
    async fn create(&self, session_id: &str) -> Result<(), CommonError>;

    /// Sliding refresh of the session expiry.
    async fn touch(&self, session_id: &str) -> Result<(), CommonError>;
}

/// Backing store for user role assignments.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Role codes currently assigned to the user. Empty when none.
    async fn get_roles(&self, user_id: &str) -> Result<Vec<String>, CommonError>;
}
