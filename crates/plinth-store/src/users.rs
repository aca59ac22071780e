//! User and role repository over the pwa database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use plinth_commons::CommonError;
use serde::Serialize;

use crate::backend::SqlBackend;
use crate::error::{Result, SqlResultExt, StoreError};

/// Input for user creation, validated by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub alias: String,
    pub email: String,
    pub password: String,
    pub birthdate: String,
    pub locale: String,
    pub region: String,
    /// JSON text stored verbatim in the profile.
    pub properties: String,
}

/// A created user, as reported back to callers.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub uid: String,
    pub alias: String,
    pub email: String,
    pub locale: String,
    pub region: String,
    pub birthdate: String,
    pub created: i64,
}

/// Repository for users and their role assignments.
#[derive(Clone)]
pub struct UserRepository {
    backend: Arc<SqlBackend>,
}

impl UserRepository {
    pub fn new(backend: Arc<SqlBackend>) -> Self {
        Self { backend }
    }

    /// Create a user across the uid/user/profile/email/disabled tables.
    ///
    /// The email must be unused; the password is bcrypt-hashed before any
    /// row is written.
    pub async fn create_user(&self, new_user: NewUser) -> Result<UserRecord> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT uid FROM user_email WHERE email = $1")
                .bind(&new_user.email)
                .fetch_optional(self.backend.pool())
                .await
                .op_context("user", "create")?;
        if existing.is_some() {
            return Err(StoreError::operation("user", "create", "email already registered"));
        }

        let password_hash = plinth_auth::password::hash_password(&new_user.password, None)
            .await
            .map_err(|e| StoreError::operation("user", "create", e))?;

        let uid = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();

        let mut tx = self.backend.pool().begin().await.op_context("user", "create")?;

        sqlx::query("INSERT INTO uid (uid, created) VALUES ($1, $2)")
            .bind(&uid)
            .bind(now)
            .execute(&mut *tx)
            .await
            .op_context("user", "create")?;

        sqlx::query(
            "INSERT INTO \"user\" (uid, password_hash, created, modified) VALUES ($1, $2, $3, $3)",
        )
        .bind(&uid)
        .bind(&password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .op_context("user", "create")?;

        sqlx::query(
            "INSERT INTO user_profile (uid, alias, locale, region, birthdate, properties)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&uid)
        .bind(&new_user.alias)
        .bind(&new_user.locale)
        .bind(&new_user.region)
        .bind(&new_user.birthdate)
        .bind(&new_user.properties)
        .execute(&mut *tx)
        .await
        .op_context("user", "create")?;

        sqlx::query("INSERT INTO user_email (email, uid) VALUES ($1, $2)")
            .bind(&new_user.email)
            .bind(&uid)
            .execute(&mut *tx)
            .await
            .op_context("user", "create")?;

        sqlx::query("INSERT INTO user_disabled (uid) VALUES ($1)")
            .bind(&uid)
            .execute(&mut *tx)
            .await
            .op_context("user", "create")?;

        tx.commit().await.op_context("user", "create")?;

        info!("Created user '{}' <{}>", new_user.alias, new_user.email);

        Ok(UserRecord {
            uid,
            alias: new_user.alias,
            email: new_user.email,
            locale: new_user.locale,
            region: new_user.region,
            birthdate: new_user.birthdate,
            created: now,
        })
    }

    /// Role codes currently assigned to the user, sorted.
    pub async fn get_roles(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT role.code FROM role
             JOIN user_role ON role.role_id = user_role.role_id
             WHERE user_role.uid = $1
             ORDER BY role.code",
        )
        .bind(user_id)
        .fetch_all(self.backend.pool())
        .await
        .op_context("user", "get-roles")?;
        Ok(rows.into_iter().map(|(code,)| code).collect())
    }

    /// Assign a role by code. Missing role codes are an error; an existing
    /// assignment is left untouched.
    pub async fn assign_role(&self, uid: &str, role_code: &str) -> Result<()> {
        let role: Option<(String,)> = sqlx::query_as("SELECT role_id FROM role WHERE code = $1")
            .bind(role_code)
            .fetch_optional(self.backend.pool())
            .await
            .op_context("user", "assign-role")?;
        let Some((role_id,)) = role else {
            return Err(StoreError::operation(
                "user",
                "assign-role",
                format!("unknown role code '{role_code}'"),
            ));
        };

        let now = Utc::now().timestamp_millis();
        let statement = if self.backend.is_sqlite() {
            "INSERT OR IGNORE INTO user_role (uid, role_id, created) VALUES ($1, $2, $3)"
        } else {
            "INSERT INTO user_role (uid, role_id, created) VALUES ($1, $2, $3)
             ON CONFLICT (uid, role_id) DO NOTHING"
        };
        sqlx::query(statement)
            .bind(uid)
            .bind(&role_id)
            .bind(now)
            .execute(self.backend.pool())
            .await
            .op_context("user", "assign-role")?;
        Ok(())
    }
}

#[async_trait]
impl plinth_session::RoleStore for UserRepository {
    async fn get_roles(&self, user_id: &str) -> std::result::Result<Vec<String>, CommonError> {
        UserRepository::get_roles(self, user_id).await.map_err(Into::into)
    }
}
