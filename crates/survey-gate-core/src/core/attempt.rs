// crates/survey-gate-core/src/core/attempt.rs
// ============================================================================
// Module: Survey Gate Submission Attempts
// Description: Persisted lifecycle record for one issued access token.
// Purpose: Define the single core entity shared by every store backend.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`SubmissionAttempt`] is created pending, read by validation, completed at
//! most once, and deleted only by the expiration reaper while still pending.
//! "Expired" is never stored; it is derived from `pending` and the expiry
//! instant via [`SubmissionAttempt::is_expired`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::AttemptId;
use crate::core::OpaqueHash;
use crate::core::SurveyId;
use crate::core::Timestamp;
use crate::core::token::AccessToken;

// ============================================================================
// SECTION: Attempt Status
// ============================================================================

/// Stored status of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Issued and not yet completed.
    Pending,
    /// Completed exactly once.
    Completed,
}

impl AttemptStatus {
    /// Returns the canonical storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses a storage label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Attempt Records
// ============================================================================

/// Attempt fields supplied by the issuer before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    /// Survey being answered.
    pub survey_id: SurveyId,
    /// Bearer credential for this attempt.
    pub access_token: AccessToken,
    /// Salted hash of the client address.
    pub ip_hash: OpaqueHash,
    /// Salted hash of the client fingerprint, when one was supplied.
    pub fingerprint_hash: Option<OpaqueHash>,
    /// Issuance instant.
    pub created_at: Timestamp,
    /// Instant after which the token is no longer usable.
    pub expires_at: Timestamp,
}

/// Persisted submission attempt.
///
/// # Invariants
/// - `completed_at.is_some()` iff `status == Completed`.
/// - `expires_at` and every hash are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAttempt {
    /// Store-assigned identifier.
    pub id: AttemptId,
    /// Survey being answered.
    pub survey_id: SurveyId,
    /// Bearer credential for this attempt.
    pub access_token: AccessToken,
    /// Salted hash of the client address.
    pub ip_hash: OpaqueHash,
    /// Salted hash of the client fingerprint, when one was supplied.
    pub fingerprint_hash: Option<OpaqueHash>,
    /// Stored lifecycle status.
    pub status: AttemptStatus,
    /// Issuance instant.
    pub created_at: Timestamp,
    /// Instant after which the token is no longer usable.
    pub expires_at: Timestamp,
    /// Completion instant.
    pub completed_at: Option<Timestamp>,
}

impl SubmissionAttempt {
    /// Builds a pending attempt from issuer input and a store-assigned id.
    #[must_use]
    pub fn pending(id: AttemptId, attempt: NewAttempt) -> Self {
        Self {
            id,
            survey_id: attempt.survey_id,
            access_token: attempt.access_token,
            ip_hash: attempt.ip_hash,
            fingerprint_hash: attempt.fingerprint_hash,
            status: AttemptStatus::Pending,
            created_at: attempt.created_at,
            expires_at: attempt.expires_at,
            completed_at: None,
        }
    }

    /// Returns true when the attempt is pending and its expiry has passed.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.status == AttemptStatus::Pending && now >= self.expires_at
    }

    /// Returns true when the token may still be validated.
    #[must_use]
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.status == AttemptStatus::Pending && now < self.expires_at
    }

    /// Returns true when the reaper may delete the attempt.
    #[must_use]
    pub fn is_purgeable(&self, now: Timestamp) -> bool {
        self.status == AttemptStatus::Pending && self.expires_at < now
    }
}
