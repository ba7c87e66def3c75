// crates/survey-gate-core/src/core/token.rs
// ============================================================================
// Module: Survey Gate Access Tokens
// Description: Opaque bearer credentials for submission attempts.
// Purpose: Generate unguessable tokens from the operating system RNG.
// Dependencies: base64, rand
// ============================================================================

//! ## Overview
//! An [`AccessToken`] is the sole credential a respondent holds for one
//! submission attempt. Tokens are `sgt_` followed by 32 bytes from the OS
//! random source encoded as unpadded base64url, giving 256 bits of entropy
//! beyond the prefix.
//!
//! Security posture: tokens are secrets; `Debug` output is redacted and no
//! component logs the token value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix marking survey gate tokens.
pub const TOKEN_PREFIX: &str = "sgt_";
/// Random bytes drawn per token.
pub const TOKEN_ENTROPY_BYTES: usize = 32;
/// Upper bound on accepted token length; longer input is never looked up.
pub const MAX_TOKEN_LENGTH: usize = 256;

// ============================================================================
// SECTION: Access Token
// ============================================================================

/// Opaque bearer token bound to one submission attempt.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token value received from a client or read from a store.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Token generation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The random source could not produce bytes.
    #[error("token entropy unavailable: {0}")]
    Entropy(String),
}

/// Source of fresh access tokens.
pub trait TokenGenerator {
    /// Produces a new token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when no token can be produced.
    fn generate(&self) -> Result<AccessToken, TokenError>;
}

/// Token generator backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureTokenGenerator;

impl TokenGenerator for SecureTokenGenerator {
    fn generate(&self) -> Result<AccessToken, TokenError> {
        let mut bytes = [0_u8; TOKEN_ENTROPY_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|err| TokenError::Entropy(err.to_string()))?;
        let mut value = String::with_capacity(TOKEN_PREFIX.len() + 44);
        value.push_str(TOKEN_PREFIX);
        URL_SAFE_NO_PAD.encode_string(bytes, &mut value);
        Ok(AccessToken(value))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
