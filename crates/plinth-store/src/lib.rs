//! SQL storage for Plinth.
//!
//! Three logical databases back the application: `pwa` (application, users,
//! RBAC), `safe` (sessions), and `files`. All are reached through sqlx's
//! `Any` driver, so a deployment may point each at SQLite or PostgreSQL
//! independently.

pub mod backend;
pub mod bootstrap;
pub mod error;
pub mod schema;
pub mod sessions;
pub mod users;

pub use backend::{DbKind, SqlBackend};
pub use bootstrap::{bootstrap_databases, BootstrapTargets, DEFAULT_ROLES};
pub use error::{SqlResultExt, StoreError};
pub use sessions::SqlSessionStore;
pub use users::{NewUser, UserRecord, UserRepository};
