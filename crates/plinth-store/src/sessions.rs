//! SQL-backed session store over the safe database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use plinth_commons::CommonError;
use serde_json::Value;

use crate::backend::SqlBackend;
use crate::error::{Result, SqlResultExt};

/// Session rows with JSON properties and a sliding expiry.
#[derive(Clone)]
pub struct SqlSessionStore {
    backend: Arc<SqlBackend>,
    ttl_seconds: i64,
}

impl SqlSessionStore {
    pub fn new(backend: Arc<SqlBackend>, ttl_seconds: i64) -> Self {
        Self { backend, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    fn expiry_from_now(&self) -> i64 {
        Utc::now().timestamp_millis() + self.ttl_seconds * 1000
    }

    /// Replace the stored properties of a live session.
    pub async fn put_properties(&self, session_id: &str, properties: &Value) -> Result<()> {
        let data = serde_json::to_string(properties)
            .map_err(|e| crate::error::StoreError::operation("session", "put-properties", e))?;
        sqlx::query("UPDATE session SET data = $1, expires = $2 WHERE session_id = $3")
            .bind(&data)
            .bind(self.expiry_from_now())
            .bind(session_id)
            .execute(self.backend.pool())
            .await
            .op_context("session", "put-properties")?;
        Ok(())
    }

    /// Delete rows whose expiry has passed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires <= $1")
            .bind(Utc::now().timestamp_millis())
            .execute(self.backend.pool())
            .await
            .op_context("session", "purge-expired")?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl plinth_session::SessionStore for SqlSessionStore {
    async fn get_properties(&self, session_id: &str) -> std::result::Result<Option<Value>, CommonError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT data FROM session WHERE session_id = $1 AND expires > $2",
        )
        .bind(session_id)
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(self.backend.pool())
        .await
        .op_context("session", "get-properties")?;

        match row {
            Some((data,)) => {
                let value = serde_json::from_str(&data).unwrap_or(Value::Object(Default::default()));
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, session_id: &str) -> std::result::Result<(), CommonError> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            "INSERT INTO session (session_id, data, created, expires) VALUES ($1, '{}', $2, $3)",
        )
        .bind(session_id)
        .bind(now)
        .bind(self.expiry_from_now())
        .execute(self.backend.pool())
        .await
        .op_context("session", "create")?;
        Ok(())
    }

    async fn touch(&self, session_id: &str) -> std::result::Result<(), CommonError> {
        sqlx::query("UPDATE session SET expires = $1 WHERE session_id = $2")
            .bind(self.expiry_from_now())
            .bind(session_id)
            .execute(self.backend.pool())
            .await
            .op_context("session", "touch")?;
        Ok(())
    }
}
