//! Database bootstrap for clean installations and integration tests.
//!
//! Creates or upgrades the schema in the pwa/safe/files databases and seeds
//! the fixed role set. Safe to run repeatedly: every statement is
//! `IF NOT EXISTS` and role seeding is insert-if-missing, so re-running is
//! the recovery path rather than internal retries.

use log::info;

use crate::backend::SqlBackend;
use crate::error::{Result, SqlResultExt};
use crate::schema;

/// The fixed roles every installation carries: (role_id, code, name, description).
pub const DEFAULT_ROLES: &[(&str, &str, &str, &str)] = &[
    ("role_dev", "dev", "Developer", "Development role"),
    ("role_admin", "admin", "Administrator", "Administrative role"),
    ("role_moderator", "moderator", "Moderator", "Moderation role"),
    ("role_editor", "editor", "Editor", "Content editing role"),
];

/// URL + type pairs for the three logical databases.
#[derive(Debug, Clone)]
pub struct BootstrapTargets {
    pub pwa_url: String,
    pub pwa_type: String,
    pub safe_url: String,
    pub safe_type: String,
    pub files_url: String,
    pub files_type: String,
}

/// Create/upgrade core schema in the pwa/safe/files databases.
pub async fn bootstrap_databases(targets: &BootstrapTargets) -> Result<()> {
    let pwa = SqlBackend::open(&targets.pwa_url, &targets.pwa_type).await?;
    let safe = SqlBackend::open(&targets.safe_url, &targets.safe_type).await?;
    let files = SqlBackend::open(&targets.files_url, &targets.files_type).await?;

    run_statements(&pwa, "app", "setup-base", schema::APP_TABLES).await?;
    run_statements(&pwa, "user", "setup-base", schema::USER_TABLES).await?;
    run_statements(&pwa, "user", "setup-rbac", schema::RBAC_TABLES).await?;
    run_statements(&pwa, "user", "setup-indexes", schema::PWA_INDEXES).await?;

    seed_roles(&pwa).await?;

    run_statements(&safe, "session", "setup-base", schema::SESSION_TABLES).await?;
    run_statements(&safe, "session", "setup-indexes", schema::SAFE_INDEXES).await?;

    // The files database carries no schema yet; probe the connection so a
    // misconfigured URL still fails the bootstrap.
    sqlx::query("SELECT 1")
        .execute(files.pool())
        .await
        .op_context("app", "probe-connection")?;

    info!("Database bootstrap completed");
    Ok(())
}

async fn run_statements(
    backend: &SqlBackend,
    model: &str,
    operation: &str,
    statements: &[&str],
) -> Result<()> {
    for statement in statements {
        sqlx::query(statement)
            .execute(backend.pool())
            .await
            .op_context(model, operation)?;
    }
    Ok(())
}

/// Seed the fixed roles, inserting only the missing ones.
async fn seed_roles(pwa: &SqlBackend) -> Result<()> {
    for (role_id, code, name, description) in DEFAULT_ROLES {
        let statement = if pwa.is_sqlite() {
            "INSERT OR IGNORE INTO role (role_id, code, name, description, created, modified)
             VALUES ($1, $2, $3, $4, 0, 0)"
        } else {
            "INSERT INTO role (role_id, code, name, description, created, modified)
             VALUES ($1, $2, $3, $4, 0, 0)
             ON CONFLICT (role_id) DO NOTHING"
        };
        sqlx::query(statement)
            .bind(*role_id)
            .bind(*code)
            .bind(*name)
            .bind(*description)
            .execute(pwa.pool())
            .await
            .op_context("user", "insert-role-if-missing")?;
    }
    Ok(())
}
