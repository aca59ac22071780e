//! Session resolution.
//!
//! A session is created on the first anonymous visit and carried by a
//! cookie; its properties live in the external session store and expire via
//! the store TTL. Resolution happens once per request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use plinth_auth::CookieDirective;
use plinth_commons::CommonError;
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::Value;

use crate::store::SessionStore;

/// Random bytes behind a fresh session identifier.
const SESSION_ID_BYTES: usize = 32;

/// Outcome of per-request session resolution.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// The live session identifier.
    pub id: String,
    /// Snapshot of the stored properties; always a JSON object.
    pub properties: Value,
    /// Cookie write that persists or refreshes the session id.
    pub cookie: CookieDirective,
    /// Whether this request created the session.
    pub is_new: bool,
}

/// Generate an opaque session identifier.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Resolve the request's session from the incoming cookie value.
///
/// An incoming id that is still live in the store is kept and its expiry
/// refreshed; anything else (no cookie, expired, unknown) gets a fresh
/// session row. Store failures propagate.
pub async fn resolve_session(
    cookie_value: Option<&str>,
    store: &dyn SessionStore,
    cookie_name: &str,
    ttl_seconds: i64,
) -> Result<ResolvedSession, CommonError> {
    if let Some(id) = cookie_value.filter(|v| !v.is_empty()) {
        if let Some(properties) = store.get_properties(id).await? {
            store.touch(id).await?;
            return Ok(ResolvedSession {
                id: id.to_string(),
                properties: ensure_object(properties),
                cookie: CookieDirective::http_only(cookie_name, id).with_max_age(ttl_seconds),
                is_new: false,
            });
        }
    }

    let id = generate_session_id();
    store.create(&id).await?;
    Ok(ResolvedSession {
        id: id.clone(),
        properties: Value::Object(Default::default()),
        cookie: CookieDirective::http_only(cookie_name, id).with_max_age(ttl_seconds),
        is_new: true,
    })
}

/// Non-mapping property payloads collapse to an empty object; the
/// projection and templates only ever see a map.
fn ensure_object(value: Value) -> Value {
    if value.is_object() {
        value
    } else {
        Value::Object(Default::default())
    }
}
