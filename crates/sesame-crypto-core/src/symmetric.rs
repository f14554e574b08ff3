//! AES-256-GCM authenticated encryption for site passwords at rest.
//!
//! A derived site password is sealed under the master [`KeyMaterial`] and
//! stored in its "combined" wire form, `nonce (12 bytes) || ciphertext ||
//! tag (16 bytes)`, base64-encoded for the text-valued secure store. The
//! nonce is random per seal and travels with the ciphertext. A tag
//! mismatch (wrong master secret, corrupted storage) is a hard
//! [`CryptoError::Decryption`] failure — garbage plaintext is never
//! returned.

use data_encoding::BASE64;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::key_material::KeyMaterial;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Smallest possible combined form: nonce + empty ciphertext + tag.
const MIN_COMBINED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Authenticated ciphertext in combined form.
///
/// Holds `nonce || ciphertext || tag` as one buffer, because that is the
/// only shape this data ever takes: it is produced whole by [`encrypt`],
/// base64-encoded whole into the secure store, and consumed whole by
/// [`decrypt`]. Any modification to any region makes decryption fail.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedData {
    combined: Vec<u8>,
}

impl SealedData {
    /// Decode from the base64 combined text held in the secure store.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if the text is not valid base64
    /// or decodes to fewer than 28 bytes (a nonce and a tag with nothing
    /// in between).
    pub fn from_combined_text(text: &str) -> Result<Self, CryptoError> {
        let combined = BASE64
            .decode(text.as_bytes())
            .map_err(|e| CryptoError::Encryption(format!("combined form is not base64: {e}")))?;
        if combined.len() < MIN_COMBINED_LEN {
            return Err(CryptoError::Encryption(format!(
                "combined form too short: {} bytes (minimum {MIN_COMBINED_LEN})",
                combined.len()
            )));
        }
        Ok(Self { combined })
    }

    /// Encode to the base64 combined text written to the secure store.
    #[must_use]
    pub fn to_combined_text(&self) -> String {
        BASE64.encode(&self.combined)
    }

    /// The 96-bit nonce region.
    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.combined[..NONCE_LEN]
    }

    /// The ciphertext region (same length as the original plaintext).
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.combined[NONCE_LEN..self.tag_start()]
    }

    /// The 128-bit authentication tag region.
    #[must_use]
    pub fn tag(&self) -> &[u8] {
        &self.combined[self.tag_start()..]
    }

    /// Flip a byte at an absolute offset — test hook for tamper cases.
    #[cfg(test)]
    fn corrupt_byte(&mut self, offset: usize) {
        self.combined[offset] ^= 0xFF;
    }

    fn tag_start(&self) -> usize {
        self.combined.len().saturating_sub(TAG_LEN)
    }
}

/// Seal a plaintext under master key material with a fresh random nonce.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the underlying AEAD seal fails.
pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> Result<SealedData, CryptoError> {
    let sealing_key = gcm_key(key)?;

    let mut combined = Vec::with_capacity(
        MIN_COMBINED_LEN.saturating_add(plaintext.len()),
    );
    combined.resize(NONCE_LEN, 0);
    OsRng.fill_bytes(&mut combined[..NONCE_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&combined[..NONCE_LEN]);

    combined.extend_from_slice(plaintext);
    let tag = sealing_key
        .seal_in_place_separate_tag(
            aead::Nonce::assume_unique_for_key(nonce),
            aead::Aad::empty(),
            &mut combined[NONCE_LEN..],
        )
        .map_err(|_| CryptoError::Encryption("AES-256-GCM seal failed".into()))?;
    combined.extend_from_slice(tag.as_ref());

    Ok(SealedData { combined })
}

/// Open and authenticate sealed data, returning the plaintext in a
/// [`Zeroizing`] buffer (wiped on drop).
///
/// # Errors
///
/// Returns `CryptoError::Decryption` on authentication failure — tampered
/// data or key material derived from the wrong master secret.
pub fn decrypt(sealed: &SealedData, key: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let opening_key = gcm_key(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(sealed.nonce());

    // open_in_place wants ciphertext || tag contiguously, which is exactly
    // the tail of the combined form.
    let mut in_out = Zeroizing::new(sealed.combined[NONCE_LEN..].to_vec());
    let plaintext = opening_key
        .open_in_place(
            aead::Nonce::assume_unique_for_key(nonce),
            aead::Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| CryptoError::Decryption)?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}

fn gcm_key(key: &KeyMaterial) -> Result<aead::LessSafeKey, CryptoError> {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key.as_bytes())
        .map_err(|_| CryptoError::Encryption("AES-256-GCM key rejected".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}
