//! Master-secret key material — the single SHA-256 hash of the plaintext.
//!
//! [`KeyMaterial`] is the only form of the master secret that ever leaves
//! volatile memory (and only under a permitting security level). It doubles
//! as the AES-256-GCM key for site-password encryption and, in its base64
//! textual form, as the leading component of every derivation phrase.

use std::fmt;

use data_encoding::BASE64;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::hashing::{self, DIGEST_LEN};

/// Key material length in bytes (SHA-256 output, AES-256 key).
pub const KEY_MATERIAL_LEN: usize = DIGEST_LEN;

/// The single hash of the master secret.
///
/// Zeroized on drop; `Debug` output is masked; equality is constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_MATERIAL_LEN],
}

impl KeyMaterial {
    /// Derive key material from the plaintext master secret (single hash).
    ///
    /// The caller is responsible for dropping the plaintext promptly — this
    /// type never retains it.
    #[must_use]
    pub fn from_secret(plaintext: &str) -> Self {
        Self {
            bytes: hashing::hash(plaintext.as_bytes()),
        }
    }

    /// Reconstruct key material from its base64 textual form (the form held
    /// in the secure store and in derivation phrases).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` if the text is not valid
    /// base64 or does not decode to exactly 32 bytes.
    pub fn from_base64(text: &str) -> Result<Self, CryptoError> {
        let mut decoded = BASE64
            .decode(text.as_bytes())
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("bad base64: {e}")))?;
        if decoded.len() != KEY_MATERIAL_LEN {
            let got = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "wrong length: {got} bytes (expected {KEY_MATERIAL_LEN})"
            )));
        }
        let mut bytes = [0u8; KEY_MATERIAL_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    /// The base64 textual form.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// The verifier for the secret this material was derived from — base64
    /// of the hash of the key bytes, i.e. the double hash of the plaintext.
    #[must_use]
    pub fn verifier(&self) -> String {
        hashing::hash_to_text(&self.bytes)
    }

    /// Raw key bytes, for use as the AES-256-GCM key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_MATERIAL_LEN] {
        &self.bytes
    }
}

impl PartialEq for KeyMaterial {
    /// Constant-time comparison — bitwise OR accumulation, no short circuit
    /// on the first differing byte.
    fn eq(&self, other: &Self) -> bool {
        let mut diff = 0u8;
        for (a, b) in self.bytes.iter().zip(other.bytes.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

impl Eq for KeyMaterial {}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(***)")
    }
}
