//! Form token derivation.
//!
//! Binds one rendered form instance (component key + fetch id + form id) to
//! the current UTOKEN lineage so a submission can be checked against the
//! token state it was issued under.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::tokens::TOKEN_SENTINEL;

/// Derive a form token. Deterministic in all four inputs.
pub fn ftoken_create(key: &str, fetch_id: &str, form_id: &str, utoken: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    for part in [key, fetch_id, form_id, utoken.unwrap_or(TOKEN_SENTINEL)] {
        hasher.update(part.as_bytes());
        hasher.update(b":");
    }
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
