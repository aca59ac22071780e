//! sqlx `Any` backend shared by all Plinth databases.
//!
//! Supports SQLite and PostgreSQL through one pool type; dialect-specific
//! SQL (upserts) branches on [`SqlBackend::is_sqlite`].

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::error::{Result, SqlResultExt, StoreError};

/// Database kind for SQL dialect selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Sqlite,
    Postgres,
}

impl DbKind {
    /// Parse a configured database type string.
    pub fn parse(db_type: &str) -> Result<Self> {
        match db_type.trim().to_lowercase().as_str() {
            "sqlite" => Ok(DbKind::Sqlite),
            "postgres" | "postgresql" => Ok(DbKind::Postgres),
            other => Err(StoreError::UnsupportedType(other.to_string())),
        }
    }
}

/// Connection pool plus dialect marker for one logical database.
#[derive(Debug, Clone)]
pub struct SqlBackend {
    pool: AnyPool,
    kind: DbKind,
}

impl SqlBackend {
    /// Open a database by URL and configured type.
    ///
    /// SQLite URLs without an explicit `mode` get `mode=rwc` so that a fresh
    /// deployment creates its database files.
    pub async fn open(url: &str, db_type: &str) -> Result<Self> {
        let kind = DbKind::parse(db_type)?;
        let url = match kind {
            DbKind::Sqlite if !url.contains("mode=") => {
                if url.contains('?') {
                    format!("{url}&mode=rwc")
                } else {
                    format!("{url}?mode=rwc")
                }
            }
            _ => url.to_string(),
        };
        Self::connect(&url, kind).await
    }

    /// Connect to an already-normalized URL.
    pub async fn connect(url: &str, kind: DbKind) -> Result<Self> {
        sqlx::any::install_default_drivers();

        // Shared-cache in-memory SQLite dies with its last connection, so
        // those pools must never go idle-empty.
        let in_memory = kind == DbKind::Sqlite && url.contains("mode=memory");
        let options = if in_memory {
            AnyPoolOptions::new()
                .max_connections(5)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(5)
        };

        let pool = options
            .connect(url)
            .await
            .map_err(|e| StoreError::Connection(format!("{url}: {e}")))?;

        if kind == DbKind::Sqlite {
            sqlx::query("PRAGMA busy_timeout = 5000;")
                .execute(&pool)
                .await
                .op_context("backend", "configure-sqlite")?;
        }

        Ok(Self { pool, kind })
    }

    /// In-memory SQLite backend for tests. Each call gets its own database.
    pub async fn sqlite_in_memory() -> Result<Self> {
        let unique = uuid::Uuid::new_v4();
        let url = format!("sqlite:file:mem_{unique}?mode=memory&cache=shared");
        Self::connect(&url, DbKind::Sqlite).await
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    pub fn is_sqlite(&self) -> bool {
        self.kind == DbKind::Sqlite
    }
}
