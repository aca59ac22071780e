//! Tab-change fingerprint.
//!
//! Client-side script compares this cookie across browser tabs to detect
//! whether a new tab shares the same session + token lineage. A UX
//! heuristic, not a security boundary.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use md5::{Digest, Md5};

use crate::tokens::TOKEN_SENTINEL;

/// Literal marker prepended to the fingerprint input.
const FINGERPRINT_MARKER: &str = "start";

/// URL-safe base64 of an MD5 digest.
pub fn sbase64url_md5(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Fingerprint of the current session state.
///
/// Concatenates the marker, the current UTOKEN (or sentinel), and the
/// current session id (or sentinel), then hashes.
pub fn tab_change_fingerprint(utoken: Option<&str>, session_id: Option<&str>) -> String {
    let mut detect = String::from(FINGERPRINT_MARKER);
    detect.push_str(utoken.unwrap_or(TOKEN_SENTINEL));
    detect.push_str(session_id.unwrap_or(TOKEN_SENTINEL));
    sbase64url_md5(&detect)
}
