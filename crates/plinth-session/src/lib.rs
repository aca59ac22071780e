//! Session resolution, the current-user projection, and the typed
//! per-request context.
//!
//! One request owns one [`RequestContext`]; nothing here is shared across
//! requests. The stores behind sessions and roles are reached through the
//! traits in [`store`], implemented by `plinth-store`.

pub mod context;
pub mod current_user;
pub mod session;
pub mod store;

pub use context::{LocaleSelection, RequestContext, RouteIdentity, ThemeSelection};
pub use current_user::{user_id_from_session, CurrentUser, Profile};
pub use session::{resolve_session, ResolvedSession};
pub use store::{RoleStore, SessionStore};
