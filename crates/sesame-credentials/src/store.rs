//! Secure store collaborator — the external, name-keyed secret storage.
//!
//! The engine consumes this interface; platform keychain glue implements it
//! elsewhere. Reads may show an interactive device-authentication prompt,
//! so cancellation is a first-class failure distinct from absence — callers
//! must never coerce one into the other or auto-retry a cancellation.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Failures of the secure store collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No secret exists under the requested name.
    #[error("no stored secret for this name")]
    NotFound,

    /// The user declined an interactive device-authentication prompt.
    #[error("device authentication cancelled")]
    Cancelled,

    /// Platform-specific failure the engine cannot interpret. Fatal to the
    /// in-progress operation.
    #[error("secure store failure (code {0})")]
    Unhandled(i32),
}

/// The external name-keyed secret store.
///
/// `service` namespaces an application's secrets; `account` names one
/// secret within it. All operations may block (a read under a
/// device-auth-protected item can show a system prompt), except
/// [`exists`](Self::exists), which must never prompt.
pub trait SecureStore {
    /// Idempotent upsert of a named secret.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unhandled` on platform failure.
    fn save(&self, service: &str, account: &str, secret: &str) -> Result<(), StoreError>;

    /// Read a named secret.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` — nothing stored under this name.
    /// - `StoreError::Cancelled` — the user declined device authentication.
    /// - `StoreError::Unhandled` — any other platform failure.
    fn read(&self, service: &str, account: &str) -> Result<String, StoreError>;

    /// Delete a named secret. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unhandled` on platform failure.
    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError>;

    /// Whether a secret exists under this name, without triggering an
    /// interactive authentication prompt.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unhandled` on platform failure.
    fn exists(&self, service: &str, account: &str) -> Result<bool, StoreError>;
}

/// In-process `HashMap`-backed store.
///
/// Serves tests and callers that opt out of platform keychains entirely —
/// secrets live only as long as the process. Never prompts, never cancels.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), String>>, StoreError> {
        // A poisoned lock means another thread panicked mid-write; treat it
        // as an unhandled platform failure rather than propagating the panic.
        self.entries.lock().map_err(|_| StoreError::Unhandled(-1))
    }
}

impl SecureStore for MemoryStore {
    fn save(&self, service: &str, account: &str, secret: &str) -> Result<(), StoreError> {
        self.lock()?
            .insert((service.to_owned(), account.to_owned()), secret.to_owned());
        Ok(())
    }

    fn read(&self, service: &str, account: &str) -> Result<String, StoreError> {
        self.lock()?
            .get(&(service.to_owned(), account.to_owned()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        self.lock()?.remove(&(service.to_owned(), account.to_owned()));
        Ok(())
    }

    fn exists(&self, service: &str, account: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()?
            .contains_key(&(service.to_owned(), account.to_owned())))
    }
}
