//! CSP nonce generation.
//!
//! One nonce is generated per request and carried in the request context —
//! it is both inserted into the Content-Security-Policy header and exposed
//! to the rendered context under a fixed key. There is no ambient
//! request-local cache; the dispatcher owns the value.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Generate a cryptographically secure CSP nonce.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
