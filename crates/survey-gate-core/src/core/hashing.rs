// crates/survey-gate-core/src/core/hashing.rs
// ============================================================================
// Module: Survey Gate Anonymizing Hasher
// Description: Salted one-way hashing of client addresses and fingerprints.
// Purpose: Support abuse prevention without persisting identifying data.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Client IP addresses and browser fingerprints are reduced to salted SHA-256
//! digests before they reach any store. The salt is a deployment secret shared
//! by every hash computation so repeated requests from one address map to the
//! same opaque value (required for rate limiting), while the digest cannot be
//! reversed to the original input.
//!
//! Security posture: the salt is validated once at construction; a missing or
//! weak salt is a configuration error, never a per-request failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum accepted salt length in bytes.
pub const MIN_SALT_BYTES: usize = 16;
/// Maximum accepted salt length in bytes.
pub const MAX_SALT_BYTES: usize = 1024;

// ============================================================================
// SECTION: Opaque Hash
// ============================================================================

/// Lowercase hex SHA-256 digest of a salted value.
///
/// # Invariants
/// - Produced only by [`SaltedHasher`]; there is no inverse operation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueHash(String);

impl OpaqueHash {
    /// Rehydrates a digest previously produced by [`SaltedHasher`] (store reads).
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OpaqueHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(.. 8).unwrap_or(&self.0);
        write!(f, "OpaqueHash({prefix}..)")
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Salt configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// Salt was empty or whitespace.
    #[error("hash salt is missing")]
    MissingSalt,
    /// Salt shorter than [`MIN_SALT_BYTES`].
    #[error("hash salt must be at least {MIN_SALT_BYTES} bytes (got {0})")]
    SaltTooShort(usize),
    /// Salt longer than [`MAX_SALT_BYTES`].
    #[error("hash salt must be at most {MAX_SALT_BYTES} bytes (got {0})")]
    SaltTooLong(usize),
}

// ============================================================================
// SECTION: Salted Hasher
// ============================================================================

/// Salted one-way hasher for client addresses and fingerprints.
#[derive(Clone)]
pub struct SaltedHasher {
    /// Secret salt appended to every input.
    salt: Vec<u8>,
}

impl SaltedHasher {
    /// Builds a hasher, validating the salt.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the salt is empty or outside length limits.
    pub fn new(salt: &str) -> Result<Self, HashError> {
        if salt.trim().is_empty() {
            return Err(HashError::MissingSalt);
        }
        let len = salt.len();
        if len < MIN_SALT_BYTES {
            return Err(HashError::SaltTooShort(len));
        }
        if len > MAX_SALT_BYTES {
            return Err(HashError::SaltTooLong(len));
        }
        Ok(Self {
            salt: salt.as_bytes().to_vec(),
        })
    }

    /// Hashes `value` with the configured salt.
    #[must_use]
    pub fn hash(&self, value: &str) -> OpaqueHash {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        hasher.update(&self.salt);
        OpaqueHash(hex_encode(&hasher.finalize()))
    }

    /// Hashes a client address after trimming surrounding whitespace.
    #[must_use]
    pub fn hash_client_ip(&self, client_ip: &str) -> OpaqueHash {
        self.hash(client_ip.trim())
    }

    /// Hashes an optional fingerprint; empty input yields `None`.
    #[must_use]
    pub fn hash_fingerprint(&self, fingerprint: &str) -> Option<OpaqueHash> {
        if fingerprint.is_empty() { None } else { Some(self.hash(fingerprint)) }
    }
}

impl fmt::Debug for SaltedHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltedHasher").field("salt", &"<redacted>").finish()
    }
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
