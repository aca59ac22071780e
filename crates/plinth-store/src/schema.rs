//! SQL schema definitions.
//!
//! Portable statements that work on both SQLite and PostgreSQL: TEXT and
//! BIGINT columns, `IF NOT EXISTS` everywhere, quoted `"user"` because it is
//! reserved in PostgreSQL.

/// Application-wide tables in the pwa database.
pub const APP_TABLES: &[&str] = &[
    // Global id registry; every user uid is minted here first.
    "CREATE TABLE IF NOT EXISTS uid (
        uid TEXT PRIMARY KEY NOT NULL,
        created BIGINT NOT NULL DEFAULT 0
    )",
];

/// User tables in the pwa database.
pub const USER_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS \"user\" (
        uid TEXT PRIMARY KEY NOT NULL,
        password_hash TEXT NOT NULL,
        created BIGINT NOT NULL DEFAULT 0,
        modified BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS user_profile (
        uid TEXT PRIMARY KEY NOT NULL,
        alias TEXT NOT NULL DEFAULT '',
        locale TEXT NOT NULL DEFAULT '',
        region TEXT NOT NULL DEFAULT '',
        birthdate TEXT NOT NULL DEFAULT '',
        properties TEXT NOT NULL DEFAULT '{}'
    )",
    "CREATE TABLE IF NOT EXISTS user_email (
        email TEXT PRIMARY KEY NOT NULL,
        uid TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_disabled (
        uid TEXT PRIMARY KEY NOT NULL,
        deleted BIGINT NOT NULL DEFAULT 0,
        unconfirmed BIGINT NOT NULL DEFAULT 0,
        unvalidated BIGINT NOT NULL DEFAULT 0,
        moderated BIGINT NOT NULL DEFAULT 0,
        spam BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS pin (
        uid TEXT PRIMARY KEY NOT NULL,
        pin_hash TEXT NOT NULL DEFAULT '',
        created BIGINT NOT NULL DEFAULT 0
    )",
];

/// Role-based access control tables in the pwa database.
pub const RBAC_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS role (
        role_id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        created BIGINT NOT NULL DEFAULT 0,
        modified BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS user_role (
        uid TEXT NOT NULL,
        role_id TEXT NOT NULL,
        created BIGINT NOT NULL DEFAULT 0,
        PRIMARY KEY (uid, role_id)
    )",
];

/// Indexes for the pwa database.
pub const PWA_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_user_email_uid ON user_email(uid)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_role_code ON role(code)",
    "CREATE INDEX IF NOT EXISTS idx_user_role_role ON user_role(role_id)",
];

/// Session table in the safe database.
pub const SESSION_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS session (
        session_id TEXT PRIMARY KEY NOT NULL,
        data TEXT NOT NULL DEFAULT '{}',
        created BIGINT NOT NULL DEFAULT 0,
        expires BIGINT NOT NULL DEFAULT 0
    )",
];

/// Indexes for the safe database.
pub const SAFE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_session_expires ON session(expires)"];
