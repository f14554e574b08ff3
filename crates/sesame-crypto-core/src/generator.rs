//! Deterministic, bounded password derivation — the central algorithm.
//!
//! Given a phrase (normally key material ++ username ++ url ++ renewal
//! counter) and a [`PasswordScheme`], find the first hash-derived candidate
//! (by increasing counter) that satisfies the scheme. Pure and total over
//! its bounded search space: identical inputs always yield identical
//! outputs or identical failures. No I/O, no randomness.

use data_encoding::BASE64;
use ring::digest;

use crate::error::GeneratorError;
use crate::scheme::PasswordScheme;

/// Upper bound (inclusive) of the counter search — 501 attempts total.
///
/// Load-bearing: changing this bound changes which configurations are
/// satisfiable and therefore which previously derived passwords remain
/// reproducible.
pub const MAX_COUNTER: u32 = 500;

/// Substitution key list, bound positionally to a scheme's symbol alphabet.
///
/// Base64 output is biased away from symbol characters, so without
/// substitution a minimum-symbol requirement would almost never be
/// satisfiable. Each key character maps to the symbol at the same index of
/// the alphabet; an alphabet shorter than ten characters binds only the
/// corresponding prefix of this list. The exact characters and their order
/// are load-bearing for reproducibility of previously derived passwords.
const SUBSTITUTION_KEYS: &str = "/+ZYXWVUTS";

/// Derive the first scheme-satisfying password for `phrase`.
///
/// For each counter in `0..=500`: SHA-256 the phrase with the decimal
/// counter appended, base64-encode the digest, truncate to the scheme
/// length, substitute symbol characters, and test against the scheme.
///
/// # Errors
///
/// Returns [`GeneratorError::Exhausted`] if no counter yields a satisfying
/// candidate. The caller's remedies are to change the renewal counter
/// (which reseeds the whole hash chain) or relax the scheme; the search is
/// never retried automatically.
pub fn generate(phrase: &str, scheme: &PasswordScheme) -> Result<String, GeneratorError> {
    for counter in 0..=MAX_COUNTER {
        let mut input = String::with_capacity(phrase.len().saturating_add(3));
        input.push_str(phrase);
        input.push_str(&counter.to_string());

        let digest = digest::digest(&digest::SHA256, input.as_bytes());
        let encoded = BASE64.encode(digest.as_ref());

        let candidate: String = encoded
            .chars()
            .take(scheme.length())
            .map(|c| substitute(c, scheme.symbol_alphabet()))
            .collect();

        if scheme.is_satisfied_by(&candidate) {
            return Ok(candidate);
        }
    }
    Err(GeneratorError::Exhausted {
        attempts: MAX_COUNTER.saturating_add(1),
    })
}

/// Replace a substitution-key character with its bound symbol; everything
/// else passes through unchanged.
fn substitute(c: char, symbol_alphabet: &str) -> char {
    SUBSTITUTION_KEYS
        .chars()
        .position(|key| key == c)
        .and_then(|i| symbol_alphabet.chars().nth(i))
        .unwrap_or(c)
}
