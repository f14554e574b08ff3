//! Credential error types for `sesame-credentials`.

use thiserror::Error;

use sesame_crypto_core::{CryptoError, GeneratorError};

use crate::store::StoreError;

/// Errors produced by master- and site-credential operations.
///
/// Flow outcomes that the UI must resolve (no secret saved yet, user
/// declined device authentication) are not errors — they are variants of
/// [`crate::Lookup`]. Everything here aborts the operation in progress.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Re-entered master secret does not match the stored verifier. Carries
    /// no detail about why — nothing may leak about the correct secret.
    #[error("master password does not match")]
    VerificationFailed,

    /// Key material offered for encryption does not belong to this
    /// credential's master password. Indicates a caller bug, reported as a
    /// typed error rather than a debug assertion.
    #[error("key material does not match the credential's verifier")]
    KeyMismatch,

    /// No ciphertext exists in the secure store for this site credential.
    /// Distinct from an authentication-tag failure on existing ciphertext.
    #[error("no stored ciphertext for this credential")]
    MissingCiphertext,

    /// Stored ciphertext decrypted to bytes that are not valid UTF-8 —
    /// storage corruption.
    #[error("stored ciphertext is corrupt: {0}")]
    Corrupt(String),

    /// Unexpected secure-store failure (not "not found", not cancellation).
    /// Fatal to the operation; never retried silently.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Bounded derivation search exhausted without a satisfying candidate.
    #[error(transparent)]
    Generation(#[from] GeneratorError),
}
