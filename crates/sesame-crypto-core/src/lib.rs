//! `sesame-crypto-core` — Pure cryptographic primitives for SESAME.
//!
//! This crate is the audit target: zero I/O, zero async, zero platform
//! dependencies. It holds the deterministic password derivation algorithm,
//! the scheme policy object, the hashing primitives, and the AES-256-GCM
//! layer that protects derived passwords at rest.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod hashing;

pub mod key_material;

pub mod scheme;

pub mod generator;

pub mod symmetric;

pub use error::{CryptoError, GeneratorError, SchemeError};
pub use generator::{generate, MAX_COUNTER};
pub use hashing::{double_hash, hash, hash_to_text, DIGEST_LEN};
pub use key_material::{KeyMaterial, KEY_MATERIAL_LEN};
pub use scheme::{
    CharacterClass, PasswordScheme, DEFAULT_LENGTH, DEFAULT_MIN_PER_CLASS, DEFAULT_SYMBOLS,
    MAX_SYMBOL_COUNT,
};
pub use symmetric::{decrypt, encrypt, SealedData, NONCE_LEN, TAG_LEN};
