//! Known-answer tests for the deterministic password generator.
//!
//! These vectors pin the load-bearing parts of the algorithm: the SHA-256
//! + base64 candidate chain, the positional symbol substitution table, and
//! the 501-iteration counter bound. Any change to those changes every
//! previously derived password — a failure here is a compatibility break,
//! not a bug in the test.

use sesame_crypto_core::error::GeneratorError;
use sesame_crypto_core::generator::generate;
use sesame_crypto_core::scheme::PasswordScheme;

#[test]
fn default_scheme_vector() {
    let scheme = PasswordScheme::default();
    assert_eq!(
        generate("test", &scheme).expect("should generate"),
        "G08OmFG?G@jnMgeF"
    );
}

#[test]
fn length_8_vector() {
    let scheme = PasswordScheme::with_length(8).expect("valid scheme");
    assert_eq!(generate("test", &scheme).expect("should generate"), "G08OmFG?");
}

#[test]
fn length_7_vector() {
    let scheme = PasswordScheme::with_length(7).expect("valid scheme");
    assert_eq!(generate("test", &scheme).expect("should generate"), "$DA64iu");
}

#[test]
fn no_symbols_lowercase_heavy_vector() {
    let scheme = PasswordScheme::new(8, "", 0, 7, 0, 0).expect("valid scheme");
    assert_eq!(generate("test", &scheme).expect("should generate"), "zvrvdm3m");
}

#[test]
fn impossible_symbol_demand_exhausts() {
    let scheme = PasswordScheme::new(16, "!", 7, 2, 2, 2).expect("valid scheme");
    assert!(matches!(
        generate("test", &scheme),
        Err(GeneratorError::Exhausted { attempts: 501 })
    ));
}

#[test]
fn site_phrase_shape_vector() {
    // Phrase layout used by site credentials: key base64 ++ username ++ url
    // ++ decimal renewal counter. A renewal bump must change the result.
    let phrase_0 = format!("{}{}{}{}", "A6eLJscKw4eCn7o5CHaKTO/9lox5z+H+t78wjUnT8n4=", "tester", "test.com", 0);
    let phrase_1 = format!("{}{}{}{}", "A6eLJscKw4eCn7o5CHaKTO/9lox5z+H+t78wjUnT8n4=", "tester", "test.com", 1);
    let scheme = PasswordScheme::default();
    let password_0 = generate(&phrase_0, &scheme).expect("should generate");
    let password_1 = generate(&phrase_1, &scheme).expect("should generate");
    assert_ne!(password_0, password_1);
}
