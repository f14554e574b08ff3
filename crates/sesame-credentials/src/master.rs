//! Master-secret credential — verifier storage and key-material lookup.
//!
//! A [`MasterCredential`] never holds the plaintext master secret. It
//! persists only the double-hash verifier; the single-hash key material is
//! derived on demand from a re-entered secret, cached for a short grace
//! period, and written to the secure store only when the security level
//! permits.

use serde::{Deserialize, Serialize};

use sesame_crypto_core::KeyMaterial;

use crate::cache::KeyMaterialCache;
use crate::error::CredentialError;
use crate::store::{SecureStore, StoreError};

/// Governs whether derived key material may leave volatile memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityLevel {
    /// Key material may be written to the secure store and cached.
    Persist,
    /// As `Persist`, but the store item demands device authentication
    /// (biometric or passcode) on every read.
    PersistRequireDeviceAuth,
    /// Key material is stored and cached on this device but the store item
    /// must not sync to other devices. Indistinguishable from `Persist`
    /// inside the engine; the distinction binds the store implementation.
    MemoryOnly,
    /// Key material never leaves volatile memory: no store writes, no cache
    /// reads. Every use re-prompts for the master secret.
    NeverPersist,
}

/// Three-way outcome of a key-material (or password) lookup.
///
/// Cancellation is deliberately distinct from absence: the UI must re-offer
/// a declined device prompt, not fall through to asking for the master
/// secret text as if no secret existed.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The value is available.
    Resolved(T),
    /// No secret is available — the caller must prompt the user for the
    /// master secret and call [`MasterCredential::verify_and_cache`].
    NeedsUserEntry,
    /// The user declined device authentication.
    Cancelled,
}

/// The master-secret abstraction.
///
/// `name` is the immutable identity: it keys the secure-store item, the
/// cache entry, and the persisted record. The verifier never changes after
/// creation; re-verification only confirms a re-entered secret against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCredential {
    name: String,
    security_level: SecurityLevel,
    #[serde(rename = "doubleHashedVerifier")]
    verifier: String,
}

impl MasterCredential {
    /// Rebuild a credential from its persisted record parts.
    #[must_use]
    pub fn new(name: &str, security_level: SecurityLevel, verifier: &str) -> Self {
        Self {
            name: name.to_owned(),
            security_level,
            verifier: verifier.to_owned(),
        }
    }

    /// Create a credential for a newly chosen master secret. The verifier
    /// (double hash) is computed locally; the plaintext is not retained.
    #[must_use]
    pub fn for_secret(name: &str, security_level: SecurityLevel, plaintext: &str) -> Self {
        Self::new(
            name,
            security_level,
            &KeyMaterial::from_secret(plaintext).verifier(),
        )
    }

    /// Unique human label; storage key and display hint.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The credential's security level.
    #[must_use]
    pub const fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    /// The double-hash verifier. Safe to persist and transmit.
    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Secure-store account name for this credential's key material.
    #[must_use]
    pub fn store_account(&self) -> String {
        format!("masterPassword:{}", self.name)
    }

    /// Obtain usable key material: cache first, then the secure store.
    ///
    /// Resolution order:
    /// 1. A fresh cache entry (unless `NeverPersist`) resolves immediately.
    /// 2. The secure store is read (unless `NeverPersist`): found material
    ///    refreshes the cache; "not found" means the caller must prompt;
    ///    a declined device prompt surfaces as `Lookup::Cancelled`.
    /// 3. `NeverPersist` with no cache entry always needs user entry.
    ///
    /// # Errors
    ///
    /// - `CredentialError::Store` — unexpected store failure.
    /// - `CredentialError::Crypto` — stored material is not valid base64
    ///   key material (storage corruption).
    pub fn key_material(
        &self,
        store: &dyn SecureStore,
        cache: &KeyMaterialCache,
        service: &str,
    ) -> Result<Lookup<KeyMaterial>, CredentialError> {
        if self.security_level == SecurityLevel::NeverPersist {
            return Ok(Lookup::NeedsUserEntry);
        }

        if let Some(material) = cache.get(&self.name) {
            return Ok(Lookup::Resolved(material));
        }

        match store.read(service, &self.store_account()) {
            Ok(text) => {
                let material = KeyMaterial::from_base64(&text)?;
                cache.put(&self.name, material.clone());
                Ok(Lookup::Resolved(material))
            }
            Err(StoreError::NotFound) => Ok(Lookup::NeedsUserEntry),
            Err(StoreError::Cancelled) => Ok(Lookup::Cancelled),
            Err(err) => Err(err.into()),
        }
    }

    /// Verify a re-entered master secret and, on success, derive and retain
    /// its key material.
    ///
    /// The double hash of `plaintext` must equal the stored verifier.
    /// On a match the single-hash key material is written to the secure
    /// store and cached (both skipped for `NeverPersist`), then returned.
    /// On a mismatch nothing is written — no partial cache or store state.
    ///
    /// # Errors
    ///
    /// - `CredentialError::VerificationFailed` — wrong secret; deliberately
    ///   carries no detail about the difference.
    /// - `CredentialError::Store` — the store write failed.
    pub fn verify_and_cache(
        &self,
        plaintext: &str,
        store: &dyn SecureStore,
        cache: &KeyMaterialCache,
        service: &str,
    ) -> Result<KeyMaterial, CredentialError> {
        let material = KeyMaterial::from_secret(plaintext);
        if !constant_time_str_eq(&material.verifier(), &self.verifier) {
            return Err(CredentialError::VerificationFailed);
        }

        if self.security_level != SecurityLevel::NeverPersist {
            store.save(service, &self.store_account(), &material.to_base64())?;
            cache.put(&self.name, material.clone());
        }
        Ok(material)
    }

    /// Purge the cached and persisted key material for this credential.
    /// Idempotent: purging an absent credential succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Store` if the store delete fails.
    pub fn forget(
        &self,
        store: &dyn SecureStore,
        cache: &KeyMaterialCache,
        service: &str,
    ) -> Result<(), CredentialError> {
        cache.remove(&self.name);
        store.delete(service, &self.store_account())?;
        Ok(())
    }
}

/// Constant-time string comparison for verifier checks.
fn constant_time_str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const SERVICE: &str = "SesameTest";

    fn credential(level: SecurityLevel) -> MasterCredential {
        MasterCredential::for_secret("TestPassword", level, "masterpassword")
    }

    #[test]
    fn for_secret_computes_double_hash_verifier() {
        let credential = credential(SecurityLevel::Persist);
        assert_eq!(
            credential.verifier(),
            "ilRa7Wjelqioy9Yuiay7cn6wUvp8eNT0Z7m2KpuKgqw="
        );
    }

    #[test]
    fn verify_rejects_wrong_secret_without_side_effects() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::Persist);

        let result = credential.verify_and_cache("wrong password", &store, &cache, SERVICE);
        assert!(matches!(result, Err(CredentialError::VerificationFailed)));
        assert!(cache.get(credential.name()).is_none());
        assert!(!store
            .exists(SERVICE, &credential.store_account())
            .expect("exists"));
    }

    #[test]
    fn verify_persists_and_caches_on_match() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::Persist);

        let material = credential
            .verify_and_cache("masterpassword", &store, &cache, SERVICE)
            .expect("verify should succeed");
        assert_eq!(material.verifier(), credential.verifier());
        assert_eq!(cache.get(credential.name()), Some(material.clone()));
        assert_eq!(
            store.read(SERVICE, &credential.store_account()).expect("read"),
            material.to_base64()
        );
    }

    #[test]
    fn never_persist_skips_store_and_cache() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::NeverPersist);

        credential
            .verify_and_cache("masterpassword", &store, &cache, SERVICE)
            .expect("verify should succeed");
        assert!(cache.get(credential.name()).is_none());
        assert!(!store
            .exists(SERVICE, &credential.store_account())
            .expect("exists"));
        assert_eq!(
            credential
                .key_material(&store, &cache, SERVICE)
                .expect("lookup"),
            Lookup::NeedsUserEntry
        );
    }

    #[test]
    fn lookup_resolves_from_store_and_refreshes_cache() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::Persist);
        let material = KeyMaterial::from_secret("masterpassword");
        store
            .save(SERVICE, &credential.store_account(), &material.to_base64())
            .expect("save");

        let lookup = credential
            .key_material(&store, &cache, SERVICE)
            .expect("lookup");
        assert_eq!(lookup, Lookup::Resolved(material));
        assert!(cache.get(credential.name()).is_some());
    }

    #[test]
    fn lookup_without_stored_material_needs_user_entry() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::Persist);
        assert_eq!(
            credential
                .key_material(&store, &cache, SERVICE)
                .expect("lookup"),
            Lookup::NeedsUserEntry
        );
    }

    #[test]
    fn lookup_surfaces_corrupt_stored_material_as_error() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::Persist);
        store
            .save(SERVICE, &credential.store_account(), "not key material")
            .expect("save");
        assert!(matches!(
            credential.key_material(&store, &cache, SERVICE),
            Err(CredentialError::Crypto(_))
        ));
    }

    #[test]
    fn forget_purges_cache_and_store_idempotently() {
        let store = MemoryStore::new();
        let cache = KeyMaterialCache::new();
        let credential = credential(SecurityLevel::Persist);
        credential
            .verify_and_cache("masterpassword", &store, &cache, SERVICE)
            .expect("verify");

        credential.forget(&store, &cache, SERVICE).expect("forget");
        assert!(cache.get(credential.name()).is_none());
        assert!(!store
            .exists(SERVICE, &credential.store_account())
            .expect("exists"));
        // Second purge of an absent credential still succeeds.
        credential.forget(&store, &cache, SERVICE).expect("forget again");
    }

    #[test]
    fn record_roundtrips_through_serde() {
        let credential = credential(SecurityLevel::PersistRequireDeviceAuth);
        let json = serde_json::to_string(&credential).expect("serialize");
        assert!(json.contains("doubleHashedVerifier"));
        assert!(json.contains("persistRequireDeviceAuth"));
        let restored: MasterCredential = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(credential, restored);
    }
}
