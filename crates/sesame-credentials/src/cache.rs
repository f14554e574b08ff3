//! Process-wide key-material cache with wall-clock expiry.
//!
//! Master secrets are deliberately remembered for a short grace period
//! across otherwise-stateless UI screens. The cache is an explicit service
//! object (not a hidden global) with an injected clock, so the 60-second
//! expiry and cross-instance sharing are testable with a fake clock. Share
//! one instance via `Arc` per process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sesame_crypto_core::KeyMaterial;

/// How long cached key material stays usable after it was cached.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Time source for expiry checks, injectable for tests.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time source used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    material: KeyMaterial,
    cached_at: Instant,
}

/// Shared cache of key material, keyed by master-credential name.
///
/// Expiry is re-checked on every read under the same lock that serves the
/// entry — a read either returns material that was fresh at lookup time or
/// evicts it, never both.
pub struct KeyMaterialCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl KeyMaterialCache {
    /// Cache with the default 60-second TTL and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_TTL, Arc::new(SystemClock))
    }

    /// Cache with an explicit TTL and time source.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    /// Fresh key material for a credential, or `None` if absent or expired.
    /// Expired entries are evicted on the spot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<KeyMaterial> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().ok()?;
        match entries.get(name) {
            Some(entry) if now.duration_since(entry.cached_at) < self.ttl => {
                Some(entry.material.clone())
            }
            Some(_) => {
                entries.remove(name);
                None
            }
            None => None,
        }
    }

    /// Cache key material for a credential, restarting its TTL.
    pub fn put(&self, name: &str, material: KeyMaterial) {
        let cached_at = self.clock.now();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                name.to_owned(),
                CacheEntry {
                    material,
                    cached_at,
                },
            );
        }
    }

    /// Drop a credential's cached material; no-op if absent.
    pub fn remove(&self, name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(name);
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Default for KeyMaterialCache {
    fn default() -> Self {
        Self::new()
    }
}
