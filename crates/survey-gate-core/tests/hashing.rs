// crates/survey-gate-core/tests/hashing.rs
// ============================================================================
// Module: Anonymizing Hasher Tests
// Description: Determinism, salt sensitivity, and salt validation.
// ============================================================================
//! ## Overview
//! The salted hash must be stable for a fixed salt, differ across salts, and
//! refuse weak salts at construction.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use survey_gate_core::HashError;
use survey_gate_core::SaltedHasher;

const SALT_A: &str = "test-salt-0123456789abcdef";
const SALT_B: &str = "other-salt-0123456789abcdef";

/// Tests a known digest of address followed by salt.
#[test]
fn known_answer_for_address() {
    let hasher = SaltedHasher::new(SALT_A).unwrap();
    assert_eq!(
        hasher.hash("203.0.113.7").as_str(),
        "8846012e6afbf34651e69224831a1b52955ad30edf61bdde53ff58600d7a1b8f"
    );
}

/// Tests weak salts fail at construction.
#[test]
fn rejects_weak_salts() {
    assert_eq!(SaltedHasher::new("").unwrap_err(), HashError::MissingSalt);
    assert_eq!(SaltedHasher::new("    ").unwrap_err(), HashError::MissingSalt);
    assert_eq!(SaltedHasher::new("short").unwrap_err(), HashError::SaltTooShort(5));
    assert!(SaltedHasher::new(&"s".repeat(2048)).is_err());
}

/// Tests debug output never shows the salt.
#[test]
fn debug_redacts_salt() {
    let hasher = SaltedHasher::new(SALT_A).unwrap();
    assert!(!format!("{hasher:?}").contains(SALT_A));
}

/// Tests empty fingerprints produce no hash.
#[test]
fn empty_fingerprint_has_no_hash() {
    let hasher = SaltedHasher::new(SALT_A).unwrap();
    assert!(hasher.hash_fingerprint("").is_none());
    assert!(hasher.hash_fingerprint("abc").is_some());
}

proptest! {
    #[test]
    fn hash_is_deterministic_hex(value in ".{0,64}") {
        let hasher = SaltedHasher::new(SALT_A).unwrap();
        let first = hasher.hash(&value);
        let second = hasher.hash(&value);
        prop_assert_eq!(first.as_str(), second.as_str());
        prop_assert_eq!(first.as_str().len(), 64);
        prop_assert!(first.as_str().chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
    }

    #[test]
    fn hash_depends_on_salt(value in "[0-9.]{7,15}") {
        let a = SaltedHasher::new(SALT_A).unwrap();
        let b = SaltedHasher::new(SALT_B).unwrap();
        prop_assert_ne!(a.hash(&value), b.hash(&value));
    }
}
