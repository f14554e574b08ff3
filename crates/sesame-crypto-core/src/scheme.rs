//! Password shape policy — length, symbol alphabet, per-class minimums.
//!
//! A [`PasswordScheme`] describes what a derived password must look like.
//! Construction validates every invariant and fails with a descriptive
//! [`SchemeError`] rather than clamping; a scheme value in hand is always
//! internally consistent.

use serde::{Deserialize, Serialize};

use crate::error::SchemeError;

/// Default password length.
pub const DEFAULT_LENGTH: usize = 16;

/// Default symbol alphabet — ten non-alphanumeric characters, in the order
/// they bind to the generator's substitution key list.
pub const DEFAULT_SYMBOLS: &str = "/+@$?#%!^_";

/// Maximum number of distinct characters in a symbol alphabet. Bounded by
/// the generator's ten-slot substitution key list.
pub const MAX_SYMBOL_COUNT: usize = 10;

/// Default per-class minimum for the default 16-character length.
pub const DEFAULT_MIN_PER_CLASS: usize = 2;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// The four character classes a scheme counts toward its minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    /// Unicode lowercase letters.
    LowerCase,
    /// Unicode uppercase letters.
    UpperCase,
    /// Characters of the scheme's configured symbol alphabet.
    Symbol,
    /// ASCII digits 0–9.
    Numeric,
}

// ---------------------------------------------------------------------------
// PasswordScheme
// ---------------------------------------------------------------------------

/// Validated password shape policy.
///
/// Immutable once constructed. Serialized with the persisted site record so
/// that re-derivation always replays the exact policy the password was
/// generated under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawScheme")]
pub struct PasswordScheme {
    length: usize,
    symbol_alphabet: String,
    min_symbols: usize,
    min_lower_case: usize,
    min_upper_case: usize,
    min_numeric: usize,
}

/// Unvalidated deserialization shape — converted through [`PasswordScheme::new`]
/// so records loaded from disk cannot smuggle in an invalid scheme.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScheme {
    length: usize,
    symbol_alphabet: String,
    min_symbols: usize,
    min_lower_case: usize,
    min_upper_case: usize,
    min_numeric: usize,
}

impl TryFrom<RawScheme> for PasswordScheme {
    type Error = SchemeError;

    fn try_from(raw: RawScheme) -> Result<Self, SchemeError> {
        Self::new(
            raw.length,
            &raw.symbol_alphabet,
            raw.min_symbols,
            raw.min_lower_case,
            raw.min_upper_case,
            raw.min_numeric,
        )
    }
}

impl PasswordScheme {
    /// Construct a validated scheme.
    ///
    /// # Errors
    ///
    /// - `SchemeError::Length` — `length` is zero, or the per-class minimums
    ///   cannot all fit within `length`.
    /// - `SchemeError::Symbol` — more than [`MAX_SYMBOL_COUNT`] symbols, an
    ///   alphanumeric or duplicate symbol character, or `min_symbols > 0`
    ///   with an empty alphabet.
    pub fn new(
        length: usize,
        symbol_alphabet: &str,
        min_symbols: usize,
        min_lower_case: usize,
        min_upper_case: usize,
        min_numeric: usize,
    ) -> Result<Self, SchemeError> {
        if length == 0 {
            return Err(SchemeError::Length("length must be at least 1".into()));
        }

        let symbol_count = symbol_alphabet.chars().count();
        if symbol_count > MAX_SYMBOL_COUNT {
            return Err(SchemeError::Symbol(format!(
                "{symbol_count} symbols configured (maximum {MAX_SYMBOL_COUNT})"
            )));
        }
        for (i, c) in symbol_alphabet.chars().enumerate() {
            if c.is_alphanumeric() {
                return Err(SchemeError::Symbol(format!(
                    "symbol character {c:?} is alphanumeric"
                )));
            }
            if symbol_alphabet.chars().take(i).any(|seen| seen == c) {
                return Err(SchemeError::Symbol(format!(
                    "duplicate symbol character {c:?}"
                )));
            }
        }
        if min_symbols > 0 && symbol_count == 0 {
            return Err(SchemeError::Symbol(
                "minimum symbol count requires a non-empty symbol alphabet".into(),
            ));
        }

        let min_total = min_symbols
            .saturating_add(min_lower_case)
            .saturating_add(min_upper_case)
            .saturating_add(min_numeric);
        if min_total > length {
            return Err(SchemeError::Length(format!(
                "per-class minimums require {min_total} characters but length is {length}"
            )));
        }

        Ok(Self {
            length,
            symbol_alphabet: symbol_alphabet.to_owned(),
            min_symbols,
            min_lower_case,
            min_upper_case,
            min_numeric,
        })
    }

    /// Scheme of the given length with the default alphabet and per-class
    /// minimums scaled as `round(length / 8)` — 2 per class at the default
    /// length of 16, 1 per class at length 8, 0 below length 4.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::Length` if `length` is zero.
    pub fn with_length(length: usize) -> Result<Self, SchemeError> {
        let min_per_class = length.saturating_add(4) / 8;
        Self::new(
            length,
            DEFAULT_SYMBOLS,
            min_per_class,
            min_per_class,
            min_per_class,
            min_per_class,
        )
    }

    /// Target password length.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Configured symbol alphabet, in substitution-binding order.
    #[must_use]
    pub fn symbol_alphabet(&self) -> &str {
        &self.symbol_alphabet
    }

    /// Classify a character against the four fixed classes.
    ///
    /// Returns `None` for a character in no class — it counts toward no
    /// minimum but still occupies a length slot.
    #[must_use]
    pub fn classify(&self, c: char) -> Option<CharacterClass> {
        if c.is_lowercase() {
            Some(CharacterClass::LowerCase)
        } else if c.is_uppercase() {
            Some(CharacterClass::UpperCase)
        } else if c.is_ascii_digit() {
            Some(CharacterClass::Numeric)
        } else if self.symbol_alphabet.contains(c) {
            Some(CharacterClass::Symbol)
        } else {
            None
        }
    }

    /// Whether a candidate satisfies this scheme.
    ///
    /// The candidate must be exactly `length` characters. Per-class counts
    /// are accumulated in a single scan with an early `true` as soon as all
    /// four minimums are met — a performance shortcut only; it never changes
    /// the answer.
    #[must_use]
    pub fn is_satisfied_by(&self, candidate: &str) -> bool {
        if candidate.chars().count() != self.length {
            return false;
        }
        let mut symbols = 0usize;
        let mut lower = 0usize;
        let mut upper = 0usize;
        let mut numeric = 0usize;
        for c in candidate.chars() {
            match self.classify(c) {
                Some(CharacterClass::Symbol) => symbols = symbols.saturating_add(1),
                Some(CharacterClass::LowerCase) => lower = lower.saturating_add(1),
                Some(CharacterClass::UpperCase) => upper = upper.saturating_add(1),
                Some(CharacterClass::Numeric) => numeric = numeric.saturating_add(1),
                None => {}
            }
            if symbols >= self.min_symbols
                && lower >= self.min_lower_case
                && upper >= self.min_upper_case
                && numeric >= self.min_numeric
            {
                return true;
            }
        }
        false
    }
}

impl Default for PasswordScheme {
    /// Length 16, the default ten-symbol alphabet, minimum 2 of each class.
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            symbol_alphabet: DEFAULT_SYMBOLS.to_owned(),
            min_symbols: DEFAULT_MIN_PER_CLASS,
            min_lower_case: DEFAULT_MIN_PER_CLASS,
            min_upper_case: DEFAULT_MIN_PER_CLASS,
            min_numeric: DEFAULT_MIN_PER_CLASS,
        }
    }
}
