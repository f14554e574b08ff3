//! Cryptographic error types for `sesame-crypto-core`.

use thiserror::Error;

/// Errors produced by hashing, key handling, and authenticated encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// AES-256-GCM setup or sealing failed, or sealed input was malformed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The authentication tag did not verify: tampered data or wrong key.
    #[error("decryption failed: tag did not authenticate")]
    Decryption,

    /// Key material could not be constructed (bad base64, wrong length).
    #[error("bad key material: {0}")]
    InvalidKeyMaterial(String),
}

/// Password scheme validation errors, raised at construction time.
///
/// A scheme that fails validation is never produced — construction is
/// all-or-nothing, with no clamping of out-of-range values.
#[derive(Debug, Error)]
pub enum SchemeError {
    /// Length constraint violated (non-positive length, or per-class
    /// minimums that cannot fit in the requested length).
    #[error("invalid password length: {0}")]
    Length(String),

    /// Symbol alphabet constraint violated (too many symbols, alphanumeric
    /// or duplicate symbol characters, or a symbol minimum with no alphabet).
    #[error("invalid symbol alphabet: {0}")]
    Symbol(String),
}

/// Deterministic password generation failure.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// No counter in the bounded search produced a candidate satisfying the
    /// scheme. Remedies: change the renewal counter (which changes the whole
    /// hash chain) or relax the scheme's minimums.
    #[error("no satisfying candidate for this configuration after {attempts} attempts")]
    Exhausted {
        /// Number of counter values tried (the full bounded search space).
        attempts: u32,
    },
}
