// crates/survey-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Survey Gate Interfaces
// Description: Backend-agnostic seams for survey facts and attempt storage.
// Purpose: Let the admission runtime run unchanged over memory or SQLite.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The runtime holds no mutable state of its own; every concurrency guarantee
//! comes from the [`SubmissionStore`] implementation. Each method below is a
//! single atomic store operation: callers never read a record and then write
//! it back.
//!
//! Security posture: stores only ever see salted hashes, never raw client
//! addresses or fingerprints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AccessToken;
use crate::core::AttemptCounts;
use crate::core::AttemptId;
use crate::core::NewAttempt;
use crate::core::OpaqueHash;
use crate::core::SubmissionAttempt;
use crate::core::SurveyId;
use crate::core::SurveyRecord;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Survey Lookup
// ============================================================================

/// Survey lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyLookupError {
    /// Backend could not be reached or read.
    #[error("survey lookup io error: {0}")]
    Io(String),
    /// Stored survey data is malformed.
    #[error("survey lookup invalid data: {0}")]
    Invalid(String),
}

/// Read access to survey status and acceptance windows.
pub trait SurveyLookup {
    /// Returns the survey, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyLookupError`] when the backend fails.
    fn survey(&self, survey_id: SurveyId) -> Result<Option<SurveyRecord>, SurveyLookupError>;
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Submission store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("submission store io error: {0}")]
    Io(String),
    /// Store backend error.
    #[error("submission store error: {0}")]
    Store(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("submission store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("submission store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("submission store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint rejected the write.
    #[error("submission store conflict: {0}")]
    Conflict(String),
}

/// Issuances observed for one (survey, client hash) pair inside a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecentIssuance {
    /// Attempts created at or after the window start.
    pub count: u64,
    /// Creation instant of the oldest attempt in the window.
    pub oldest_created_at: Option<Timestamp>,
}

/// Outcome of an insert guarded by a rate-limit ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitedInsert {
    /// The attempt was stored.
    Inserted(SubmissionAttempt),
    /// The ceiling was already reached; nothing was stored.
    Limited(RecentIssuance),
}

/// Persistence for submission attempts.
pub trait SubmissionStore {
    /// Stores a new pending attempt and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the access token already exists,
    /// or another [`StoreError`] when persistence fails.
    fn insert_attempt(&self, attempt: &NewAttempt) -> Result<SubmissionAttempt, StoreError>;

    /// Counts recent issuances and inserts only while the count is below
    /// `ceiling`, as one atomic operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn insert_attempt_within_limit(
        &self,
        attempt: &NewAttempt,
        window_start: Timestamp,
        ceiling: u32,
    ) -> Result<LimitedInsert, StoreError>;

    /// Counts attempts for `(survey_id, ip_hash)` created at or after
    /// `window_start`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn count_recent(
        &self,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        window_start: Timestamp,
    ) -> Result<RecentIssuance, StoreError>;

    /// Finds the attempt whose token matches, is pending, and expires after
    /// `now`, in a single read.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn find_usable(
        &self,
        token: &AccessToken,
        now: Timestamp,
    ) -> Result<Option<SubmissionAttempt>, StoreError>;

    /// Marks a pending attempt completed. Returns false when no pending
    /// attempt with `id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn mark_completed(&self, id: AttemptId, now: Timestamp) -> Result<bool, StoreError>;

    /// Deletes pending attempts whose expiry is before `now`; returns the count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError>;

    /// Returns raw attempt counts for one survey, classifying expiry at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn survey_counts(&self, survey_id: SurveyId, now: Timestamp)
    -> Result<AttemptCounts, StoreError>;

    /// Loads an attempt by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn get(&self, id: AttemptId) -> Result<Option<SubmissionAttempt>, StoreError>;
}
