//! Token, nonce, cookie, and password utilities.
//!
//! Everything here is stateless: callers own the per-request context these
//! values live in, and persistence (cookies) goes through the directives the
//! dispatcher queues on the view.

pub mod cookies;
pub mod error;
pub mod fingerprint;
pub mod ftoken;
pub mod nonce;
pub mod password;
pub mod tokens;

pub use cookies::{CookieConfig, CookieDirective};
pub use error::{AuthError, AuthResult};
pub use fingerprint::tab_change_fingerprint;
pub use ftoken::ftoken_create;
pub use nonce::generate_nonce;
pub use tokens::{ltoken_create, utoken_extract, utoken_update, UtokenCookie};
