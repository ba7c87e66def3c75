// crates/survey-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Survey Gate Identifiers
// Description: Canonical identifiers for surveys and submission attempts.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Surveys and submission attempts are addressed by positive integers. Both
//! identifier types enforce the non-zero, 1-based invariant at construction so
//! a zero or negative identifier cannot reach the runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Survey identifier owned by the survey catalog.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(NonZeroU64);

impl SurveyId {
    /// Creates a new survey identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a survey identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

impl FromStr for SurveyId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value.trim().parse::<u64>().map_err(|_| IdentifierError::NotANumber)?;
        Self::from_raw(raw).ok_or(IdentifierError::Zero)
    }
}

/// Submission attempt identifier assigned by the store.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
/// - Never reused by durable stores, even after the attempt is purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(NonZeroU64);

impl AttemptId {
    /// Creates a new attempt identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates an attempt identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when parsing identifiers from untrusted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Input was not a base-10 unsigned integer.
    #[error("identifier must be a positive integer")]
    NotANumber,
    /// Input parsed to zero.
    #[error("identifier must be greater than zero")]
    Zero,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
