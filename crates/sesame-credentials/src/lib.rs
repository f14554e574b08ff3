//! `sesame-credentials` — Credential business logic for SESAME.
//!
//! Master and site credentials over an abstract secure store: verifier-only
//! master-secret handling, short-lived key-material caching, deterministic
//! site-password derivation, and encrypted persistence of derived passwords.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod cache;
pub mod error;
pub mod store;

pub mod master;

pub mod site;

pub use cache::{Clock, KeyMaterialCache, SystemClock, DEFAULT_TTL};
pub use error::CredentialError;
pub use master::{Lookup, MasterCredential, SecurityLevel};
pub use site::{SiteCredential, DEFAULT_SERVICE};
pub use store::{MemoryStore, SecureStore, StoreError};
