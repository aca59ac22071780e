//! Shared building blocks for the Plinth workspace.
//!
//! Holds the types every other crate agrees on: user identifiers, the
//! role-set model, account status flags, host allow-list helpers, and the
//! common error type. No web-framework or storage dependencies belong here.

pub mod errors;
pub mod ids;
pub mod net;
pub mod roles;
pub mod status;

pub use errors::CommonError;
pub use ids::UserId;
pub use roles::{role_key, RoleSet};
pub use status::UserStatus;
