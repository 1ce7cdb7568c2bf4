//! Write-path request signing
//!
//! The signed write header carries a per-request nonce and timestamp plus an
//! HMAC-SHA1 signature over the consumer key. The signature depends only on
//! the key pair, so the provider computes it once per process and reuses it;
//! nonce and timestamp are fresh on every call.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha1::Sha1;

use crate::constants::NONCE_LENGTH;

type HmacSha1 = Hmac<Sha1>;

/// Generate a random per-request nonce.
///
/// Produces 24 random bytes encoded as URL-safe base64 (no padding), which
/// yields exactly [`NONCE_LENGTH`] header-safe characters.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute a base64-encoded RFC 2104 HMAC-SHA1 signature of `data` under `key`.
pub fn hmac_sha1_base64(data: &str, key: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
