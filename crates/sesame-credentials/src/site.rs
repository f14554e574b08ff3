//! Site credential — binds a site identity to a master credential and a
//! password scheme, derives the site password deterministically, and keeps
//! it AEAD-encrypted in the secure store.
//!
//! The derivation tuple is (key material, username, url, renewal counter,
//! scheme): the same tuple always yields the same password, and bumping the
//! renewal counter is the sole rotation primitive — no new memorized secret
//! required, and the previous password stays recoverable by reverting the
//! counter.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use sesame_crypto_core::{generator, symmetric, KeyMaterial, PasswordScheme, SealedData};

use crate::cache::KeyMaterialCache;
use crate::error::CredentialError;
use crate::master::{Lookup, MasterCredential};
use crate::store::{SecureStore, StoreError};

/// Default secure-store service name.
pub const DEFAULT_SERVICE: &str = "SESAME";

/// A site entry: identity, renewal counter, embedded scheme, and the master
/// credential its password is derived from.
///
/// Identity is `username + url`; renewing a password mutates the entry
/// rather than creating a new one, so deletion and lookup stay stable
/// across renewals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCredential {
    username: String,
    url: String,
    resource_description: String,
    /// ISO-8601 creation timestamp.
    created: String,
    num_renewals: u32,
    #[serde(rename = "passwordSchemeParams")]
    scheme: PasswordScheme,
    #[serde(rename = "masterCredentialReference")]
    master: MasterCredential,
    #[serde(default = "default_service")]
    service: String,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_owned()
}

impl SiteCredential {
    /// Create a new site entry with a fresh creation timestamp and a
    /// renewal counter of zero.
    #[must_use]
    pub fn new(
        username: &str,
        url: &str,
        resource_description: &str,
        master: MasterCredential,
        scheme: PasswordScheme,
    ) -> Self {
        Self {
            username: username.to_owned(),
            url: url.to_owned(),
            resource_description: resource_description.to_owned(),
            created: now_iso8601(),
            num_renewals: 0,
            scheme,
            master,
            service: default_service(),
        }
    }

    /// Override the secure-store service name (test isolation, multiple
    /// profiles).
    #[must_use]
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_owned();
        self
    }

    /// Stable identity: `username + url`, unchanged by renewals.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}{}", self.username, self.url)
    }

    /// Site username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Site URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Display label.
    #[must_use]
    pub fn resource_description(&self) -> &str {
        &self.resource_description
    }

    /// ISO-8601 creation timestamp.
    #[must_use]
    pub fn created(&self) -> &str {
        &self.created
    }

    /// Renewal counter; each increment rotates the derived password.
    #[must_use]
    pub const fn num_renewals(&self) -> u32 {
        self.num_renewals
    }

    /// The owning master credential's record.
    #[must_use]
    pub const fn master(&self) -> &MasterCredential {
        &self.master
    }

    /// The embedded scheme the password is generated under.
    #[must_use]
    pub const fn scheme(&self) -> &PasswordScheme {
        &self.scheme
    }

    /// Secure-store account name for this entry's ciphertext.
    #[must_use]
    pub fn store_account(&self) -> String {
        format!("accountPassword:{}::{}", self.url, self.username)
    }

    /// Bump the renewal counter. The caller must re-run
    /// [`encrypt_and_store`](Self::encrypt_and_store) to overwrite the old
    /// ciphertext with the rotated password.
    pub fn renew(&mut self) {
        self.num_renewals = self.num_renewals.saturating_add(1);
    }

    /// Derive the site password for the given key material.
    ///
    /// Phrase layout: key material base64 ++ username ++ url ++ decimal
    /// renewal counter. Deterministic; generation failure propagates
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Generation` if the bounded search finds no
    /// scheme-satisfying candidate.
    pub fn derive(&self, key: &KeyMaterial) -> Result<String, CredentialError> {
        let mut phrase = format!(
            "{}{}{}{}",
            key.to_base64(),
            self.username,
            self.url,
            self.num_renewals
        );
        let password = generator::generate(&phrase, &self.scheme);
        phrase.zeroize();
        Ok(password?)
    }

    /// Derive the site password and write it, AEAD-encrypted under the key
    /// material, to the secure store (overwriting any previous ciphertext).
    ///
    /// Precondition: the key material must belong to this entry's master
    /// credential — its verifier must match. A mismatch means the caller
    /// mixed up credentials and would encrypt under the wrong key.
    ///
    /// # Errors
    ///
    /// - `CredentialError::KeyMismatch` — key material from a different
    ///   master secret.
    /// - `CredentialError::Generation` — derivation exhausted its search.
    /// - `CredentialError::Store` — the store write failed.
    pub fn encrypt_and_store(
        &self,
        key: &KeyMaterial,
        store: &dyn SecureStore,
    ) -> Result<(), CredentialError> {
        if key.verifier() != self.master.verifier() {
            return Err(CredentialError::KeyMismatch);
        }
        let password = self.derive(key)?;
        let sealed = symmetric::encrypt(password.as_bytes(), key)?;
        store.save(&self.service, &self.store_account(), &sealed.to_combined_text())?;
        Ok(())
    }

    /// Read and decrypt this entry's stored password.
    ///
    /// # Errors
    ///
    /// - `CredentialError::MissingCiphertext` — nothing stored for this
    ///   entry (distinct from a tag failure on existing ciphertext).
    /// - `CredentialError::Crypto(CryptoError::Decryption)` — tag mismatch:
    ///   wrong master password or corrupted storage; no plaintext returned.
    /// - `CredentialError::Corrupt` — decrypted bytes are not UTF-8.
    /// - `CredentialError::Store` — cancellation or unexpected store
    ///   failure.
    pub fn decrypt(
        &self,
        key: &KeyMaterial,
        store: &dyn SecureStore,
    ) -> Result<SecretString, CredentialError> {
        let combined = match store.read(&self.service, &self.store_account()) {
            Ok(text) => text,
            Err(StoreError::NotFound) => return Err(CredentialError::MissingCiphertext),
            Err(err) => return Err(err.into()),
        };
        let sealed = SealedData::from_combined_text(&combined)?;
        let plaintext = symmetric::decrypt(&sealed, key)?;
        let password = std::str::from_utf8(&plaintext)
            .map_err(|e| CredentialError::Corrupt(format!("not valid UTF-8: {e}")))?;
        Ok(SecretString::from(password.to_owned()))
    }

    /// Orchestrated password lookup: resolve the master key material, then
    /// decrypt. `NeedsUserEntry` and `Cancelled` surface unresolved — the
    /// UI must prompt (or re-offer the device prompt) and try again.
    ///
    /// # Errors
    ///
    /// Propagates [`decrypt`](Self::decrypt) and
    /// [`MasterCredential::key_material`] failures.
    pub fn password(
        &self,
        store: &dyn SecureStore,
        cache: &KeyMaterialCache,
    ) -> Result<Lookup<SecretString>, CredentialError> {
        match self.master.key_material(store, cache, &self.service)? {
            Lookup::Resolved(key) => Ok(Lookup::Resolved(self.decrypt(&key, store)?)),
            Lookup::NeedsUserEntry => Ok(Lookup::NeedsUserEntry),
            Lookup::Cancelled => Ok(Lookup::Cancelled),
        }
    }

    /// Purge this entry's ciphertext from the secure store. The persisted
    /// record itself is the caller's to remove.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Store` if the store delete fails.
    pub fn delete(&self, store: &dyn SecureStore) -> Result<(), CredentialError> {
        store.delete(&self.service, &self.store_account())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
fn now_iso8601() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    epoch_to_iso8601(secs)
}

/// Format epoch seconds as ISO-8601 UTC (valid for years 1970–9999).
#[allow(clippy::arithmetic_side_effects)]
const fn epoch_to_iso8601_parts(epoch_secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let total_days = epoch_secs / 86_400;
    let day_secs = epoch_secs % 86_400;

    // Civil calendar computation after Howard Hinnant's `civil_from_days`,
    // with the epoch shifted to 0000-03-01 so leap days land at year end.
    let z = total_days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;

    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let mut year = yoe + era * 400;
    if month <= 2 {
        year += 1;
    }

    (
        year,
        month,
        day,
        day_secs / 3600,
        (day_secs % 3600) / 60,
        day_secs % 60,
    )
}

fn epoch_to_iso8601(epoch_secs: u64) -> String {
    let (year, month, day, hour, minute, second) = epoch_to_iso8601_parts(epoch_secs);
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
}
