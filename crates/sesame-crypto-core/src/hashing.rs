//! One-way hashing primitives shared by every other component.
//!
//! All site-password derivation, master-secret verification, and key-material
//! computation bottoms out in these three functions:
//! - [`hash`] — SHA-256 digest of raw bytes
//! - [`hash_to_text`] — base64 of the digest (the textual key-material form)
//! - [`double_hash`] — base64 of the digest of the digest (the verifier form)

use data_encoding::BASE64;
use ring::digest;

/// SHA-256 digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 hash of arbitrary bytes.
#[must_use]
pub fn hash(data: &[u8]) -> [u8; DIGEST_LEN] {
    let digest = digest::digest(&digest::SHA256, data);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

/// Base64-encoded SHA-256 hash of arbitrary bytes.
#[must_use]
pub fn hash_to_text(data: &[u8]) -> String {
    BASE64.encode(&hash(data))
}

/// Base64-encoded double SHA-256 hash of a text secret.
///
/// This is the verifier form: it confirms a re-entered secret without ever
/// revealing the single-hash key material, because inverting one SHA-256
/// application is required to get from the verifier to the encryption key.
#[must_use]
pub fn double_hash(text: &str) -> String {
    let single = hash(text.as_bytes());
    hash_to_text(&single)
}
