#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! End-to-end credential flows: master verification, key-material caching,
//! cancellation handling, and the site-password round trip.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use secrecy::ExposeSecret;
use sesame_credentials::{
    Clock, CredentialError, KeyMaterialCache, Lookup, MasterCredential, MemoryStore,
    SecureStore, SecurityLevel, SiteCredential, StoreError, DEFAULT_TTL,
};
use sesame_crypto_core::{KeyMaterial, PasswordScheme};

const SERVICE: &str = "SesameFlowTest";
const MASTER_SECRET: &str = "masterpassword";

/// Manually advanced clock for TTL tests.
struct FakeClock {
    now: Mutex<Instant>,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

/// Store wrapper that fails every read with a declined device prompt,
/// simulating `persistRequireDeviceAuth` with a user who cancels.
struct CancellingStore {
    inner: MemoryStore,
}

impl SecureStore for CancellingStore {
    fn save(&self, service: &str, account: &str, secret: &str) -> Result<(), StoreError> {
        self.inner.save(service, account, secret)
    }

    fn read(&self, _service: &str, _account: &str) -> Result<String, StoreError> {
        Err(StoreError::Cancelled)
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        self.inner.delete(service, account)
    }

    fn exists(&self, service: &str, account: &str) -> Result<bool, StoreError> {
        self.inner.exists(service, account)
    }
}

fn master(level: SecurityLevel) -> MasterCredential {
    MasterCredential::for_secret("TestPassword", level, MASTER_SECRET)
}

fn site(level: SecurityLevel) -> SiteCredential {
    SiteCredential::new(
        "tester",
        "test.com",
        "Test Service",
        master(level),
        PasswordScheme::default(),
    )
    .with_service(SERVICE)
}

#[test]
fn saved_site_password_round_trip() {
    let store = MemoryStore::new();
    let cache = KeyMaterialCache::new();
    let site = site(SecurityLevel::Persist);

    // The user enters the master secret once; the engine verifies, caches,
    // and persists the key material, then encrypts the derived password.
    let key = site
        .master()
        .verify_and_cache(MASTER_SECRET, &store, &cache, SERVICE)
        .expect("verification should succeed");
    site.encrypt_and_store(&key, &store).expect("store password");

    // A later screen asks for the password with no user interaction.
    let lookup = site.password(&store, &cache).expect("lookup");
    let Lookup::Resolved(password) = lookup else {
        panic!("expected a resolved password");
    };
    assert_eq!(
        password.expose_secret(),
        site.derive(&key).expect("derive")
    );
}

#[test]
fn restart_resolves_from_store_without_cache() {
    let store = MemoryStore::new();
    let site = site(SecurityLevel::Persist);

    let key = site
        .master()
        .verify_and_cache(MASTER_SECRET, &store, &KeyMaterialCache::new(), SERVICE)
        .expect("verify");
    site.encrypt_and_store(&key, &store).expect("store password");

    // Fresh cache simulates an app restart: the store still resolves.
    let fresh_cache = KeyMaterialCache::new();
    let lookup = site.password(&store, &fresh_cache).expect("lookup");
    assert!(matches!(lookup, Lookup::Resolved(_)));
}

#[test]
fn never_persist_always_needs_user_entry() {
    let store = MemoryStore::new();
    let cache = KeyMaterialCache::new();
    let site = site(SecurityLevel::NeverPersist);

    let key = site
        .master()
        .verify_and_cache(MASTER_SECRET, &store, &cache, SERVICE)
        .expect("verify");
    site.encrypt_and_store(&key, &store).expect("store password");

    // Even immediately after verification, nothing was retained.
    assert!(matches!(
        site.password(&store, &cache).expect("lookup"),
        Lookup::NeedsUserEntry
    ));
}

#[test]
fn cached_material_expires_after_ttl() {
    let store = MemoryStore::new();
    let clock = Arc::new(FakeClock::new());
    let cache = KeyMaterialCache::with_clock(DEFAULT_TTL, Arc::clone(&clock) as Arc<dyn Clock>);
    let credential = master(SecurityLevel::Persist);

    credential
        .verify_and_cache(MASTER_SECRET, &store, &cache, SERVICE)
        .expect("verify");

    clock.advance(Duration::from_secs(59));
    assert!(matches!(
        credential.key_material(&store, &cache, SERVICE).expect("lookup"),
        Lookup::Resolved(_)
    ));

    // Past the TTL the cache misses; the store still resolves (Persist),
    // which also re-caches the material.
    clock.advance(Duration::from_secs(2));
    assert!(matches!(
        credential.key_material(&store, &cache, SERVICE).expect("lookup"),
        Lookup::Resolved(_)
    ));

    // With the stored copy forgotten as well, only user entry remains.
    credential.forget(&store, &cache, SERVICE).expect("forget");
    assert!(matches!(
        credential.key_material(&store, &cache, SERVICE).expect("lookup"),
        Lookup::NeedsUserEntry
    ));
}

#[test]
fn declined_device_prompt_surfaces_as_cancelled() {
    let store = CancellingStore {
        inner: MemoryStore::new(),
    };
    let cache = KeyMaterialCache::new();
    let site = site(SecurityLevel::PersistRequireDeviceAuth);

    let key = site
        .master()
        .verify_and_cache(MASTER_SECRET, &store, &cache, SERVICE)
        .expect("verify");
    site.encrypt_and_store(&key, &store).expect("store password");

    // Empty cache forces a store read, which the user declines. The
    // outcome is Cancelled — not NeedsUserEntry, not an error.
    cache.clear();
    assert!(matches!(
        site.password(&store, &cache).expect("lookup"),
        Lookup::Cancelled
    ));
}

#[test]
fn unexpected_store_failure_aborts_the_operation() {
    struct BrokenStore;

    impl SecureStore for BrokenStore {
        fn save(&self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unhandled(-25_293))
        }
        fn read(&self, _: &str, _: &str) -> Result<String, StoreError> {
            Err(StoreError::Unhandled(-25_293))
        }
        fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unhandled(-25_293))
        }
        fn exists(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unhandled(-25_293))
        }
    }

    let cache = KeyMaterialCache::new();
    let credential = master(SecurityLevel::Persist);
    assert!(matches!(
        credential.verify_and_cache(MASTER_SECRET, &BrokenStore, &cache, SERVICE),
        Err(CredentialError::Store(StoreError::Unhandled(-25_293)))
    ));
    assert!(matches!(
        credential.key_material(&BrokenStore, &cache, SERVICE),
        Err(CredentialError::Store(StoreError::Unhandled(-25_293)))
    ));
}

#[test]
fn wrong_master_password_decrypts_nothing() {
    let store = MemoryStore::new();
    let site = site(SecurityLevel::Persist);
    let key = KeyMaterial::from_secret(MASTER_SECRET);
    site.encrypt_and_store(&key, &store).expect("store password");

    let wrong = KeyMaterial::from_secret("not the master password");
    assert!(site.decrypt(&wrong, &store).is_err());
}

#[test]
fn two_sites_share_one_master_but_get_distinct_passwords() {
    let store = MemoryStore::new();
    let key = KeyMaterial::from_secret(MASTER_SECRET);
    let first = site(SecurityLevel::Persist);
    let second = SiteCredential::new(
        "tester2",
        "test.com",
        "Test Service",
        master(SecurityLevel::Persist),
        PasswordScheme::default(),
    )
    .with_service(SERVICE);

    first.encrypt_and_store(&key, &store).expect("store first");
    second.encrypt_and_store(&key, &store).expect("store second");

    let a = first.decrypt(&key, &store).expect("decrypt first");
    let b = second.decrypt(&key, &store).expect("decrypt second");
    assert_ne!(a.expose_secret(), b.expose_secret());
}

#[test]
fn forgetting_the_master_leaves_site_ciphertext_undecryptable_without_entry() {
    let store = MemoryStore::new();
    let cache = KeyMaterialCache::new();
    let site = site(SecurityLevel::Persist);

    let key = site
        .master()
        .verify_and_cache(MASTER_SECRET, &store, &cache, SERVICE)
        .expect("verify");
    site.encrypt_and_store(&key, &store).expect("store password");

    site.master().forget(&store, &cache, SERVICE).expect("forget");
    assert!(matches!(
        site.password(&store, &cache).expect("lookup"),
        Lookup::NeedsUserEntry
    ));

    // Re-entering the master secret restores access to the same password.
    let restored_key = site
        .master()
        .verify_and_cache(MASTER_SECRET, &store, &cache, SERVICE)
        .expect("re-verify");
    let password = site.decrypt(&restored_key, &store).expect("decrypt");
    assert_eq!(
        password.expose_secret(),
        site.derive(&restored_key).expect("derive")
    );
}
