//! User token (UTOKEN) and long token (LTOKEN) utilities.
//!
//! The UTOKEN is a rotating, cookie-persisted token tied to session
//! continuity. It rotates only on plain navigational GET requests; every
//! other method/AJAX combination merely extracts the incoming value so that
//! in-flight forms and background calls never invalidate token state.
//!
//! The LTOKEN is derived deterministically from the UTOKEN on every request
//! and is never persisted on its own.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes behind a freshly rotated UTOKEN.
const UTOKEN_BYTES: usize = 24;

/// Domain separator for the LTOKEN derivation.
const LTOKEN_CONTEXT: &str = "ltoken";

/// Sentinel used in derivations when no UTOKEN is present.
pub const TOKEN_SENTINEL: &str = "none";

/// Cookie follow-up for a UTOKEN operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtokenCookie {
    /// Persist the rotated value.
    Set(String),
    /// Re-send the existing value unchanged (sliding refresh), if any.
    Refresh(Option<String>),
}

/// Rotate the UTOKEN.
///
/// Called only for non-AJAX GET requests: plain page navigation is the one
/// moment rotation cannot race an in-flight form submission. The previous
/// value does not feed the new one; rotation is a fresh draw.
pub fn utoken_update(_previous: Option<&str>) -> (String, UtokenCookie) {
    let mut bytes = [0u8; UTOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let cookie = UtokenCookie::Set(token.clone());
    (token, cookie)
}

/// Extract the UTOKEN without rotating it.
///
/// Called for every method/AJAX combination other than plain GET.
pub fn utoken_extract(previous: Option<&str>) -> (Option<String>, UtokenCookie) {
    let token = previous.map(str::to_string);
    let cookie = UtokenCookie::Refresh(token.clone());
    (token, cookie)
}

/// Derive the per-request LTOKEN from the UTOKEN.
///
/// Deterministic in its input: the same UTOKEN yields the same LTOKEN, so a
/// form rendered and submitted within one token lineage binds cleanly.
pub fn ltoken_create(utoken: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(LTOKEN_CONTEXT.as_bytes());
    hasher.update(b":");
    hasher.update(utoken.unwrap_or(TOKEN_SENTINEL).as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rotates_every_call() {
        let prev = "previous-token";
        let (a, _) = utoken_update(Some(prev));
        let (b, _) = utoken_update(Some(prev));
        assert_ne!(a, b);
        assert_ne!(a, prev);
    }

    #[test]
    fn test_update_emits_set_cookie() {
        let (token, cookie) = utoken_update(None);
        assert_eq!(cookie, UtokenCookie::Set(token));
    }

    #[test]
    fn test_extract_returns_value_unchanged() {
        let (token, cookie) = utoken_extract(Some("abc123"));
        assert_eq!(token.as_deref(), Some("abc123"));
        assert_eq!(cookie, UtokenCookie::Refresh(Some("abc123".to_string())));
    }

    #[test]
    fn test_extract_without_cookie() {
        let (token, cookie) = utoken_extract(None);
        assert!(token.is_none());
        assert_eq!(cookie, UtokenCookie::Refresh(None));
    }

    #[test]
    fn test_ltoken_is_deterministic() {
        assert_eq!(ltoken_create(Some("tok")), ltoken_create(Some("tok")));
        assert_ne!(ltoken_create(Some("tok")), ltoken_create(Some("other")));
    }

    #[test]
    fn test_ltoken_without_utoken_uses_sentinel() {
        assert_eq!(ltoken_create(None), ltoken_create(None));
        assert_ne!(ltoken_create(None), ltoken_create(Some("tok")));
    }
}
