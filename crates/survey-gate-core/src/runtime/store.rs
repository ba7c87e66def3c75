// crates/survey-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Survey Gate In-Memory Stores
// Description: Mutex-guarded submission store and survey directory.
// Purpose: Provide deterministic backends for tests and single-node demos.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemorySubmissionStore`] performs every trait method under one mutex
//! acquisition, so each call is atomic with respect to every other call just
//! like a single SQL statement. [`SharedSubmissionStore`] and
//! [`SharedSurveyLookup`] wrap any backend behind an `Arc` trait object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::AccessToken;
use crate::core::AttemptCounts;
use crate::core::AttemptId;
use crate::core::AttemptStatus;
use crate::core::NewAttempt;
use crate::core::OpaqueHash;
use crate::core::SubmissionAttempt;
use crate::core::SurveyId;
use crate::core::SurveyRecord;
use crate::core::SurveyStatus;
use crate::core::Timestamp;
use crate::interfaces::LimitedInsert;
use crate::interfaces::RecentIssuance;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SurveyLookup;
use crate::interfaces::SurveyLookupError;

// ============================================================================
// SECTION: In-Memory Submission Store
// ============================================================================

/// Attempt table plus the unique token index.
#[derive(Debug, Default)]
struct AttemptTable {
    /// Last assigned attempt id.
    last_id: u64,
    /// Attempts keyed by id.
    attempts: BTreeMap<u64, SubmissionAttempt>,
    /// Unique token index.
    tokens: HashMap<String, u64>,
}

impl AttemptTable {
    /// Counts attempts for one survey and client hash since `window_start`.
    fn recent(
        &self,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        window_start: Timestamp,
    ) -> RecentIssuance {
        let mut recent = RecentIssuance::default();
        for attempt in self.attempts.values() {
            if attempt.survey_id == survey_id
                && attempt.ip_hash == *ip_hash
                && attempt.created_at >= window_start
            {
                recent.count += 1;
                recent.oldest_created_at = Some(
                    recent
                        .oldest_created_at
                        .map_or(attempt.created_at, |oldest| oldest.min(attempt.created_at)),
                );
            }
        }
        recent
    }

    /// Inserts a pending attempt, enforcing token uniqueness.
    fn insert(&mut self, attempt: &NewAttempt) -> Result<SubmissionAttempt, StoreError> {
        if self.tokens.contains_key(attempt.access_token.as_str()) {
            return Err(StoreError::Conflict("access token already exists".to_string()));
        }
        let next = self.last_id.saturating_add(1);
        let id = AttemptId::from_raw(next)
            .ok_or_else(|| StoreError::Store("attempt id space exhausted".to_string()))?;
        let record = SubmissionAttempt::pending(id, attempt.clone());
        self.last_id = next;
        self.tokens.insert(attempt.access_token.as_str().to_string(), next);
        self.attempts.insert(next, record.clone());
        Ok(record)
    }
}

/// In-memory submission store for tests and single-process deployments.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissionStore {
    /// Attempt table protected by a mutex.
    table: Arc<Mutex<AttemptTable>>,
}

impl InMemorySubmissionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the attempt table.
    fn lock(&self) -> Result<MutexGuard<'_, AttemptTable>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn insert_attempt(&self, attempt: &NewAttempt) -> Result<SubmissionAttempt, StoreError> {
        self.lock()?.insert(attempt)
    }

    fn insert_attempt_within_limit(
        &self,
        attempt: &NewAttempt,
        window_start: Timestamp,
        ceiling: u32,
    ) -> Result<LimitedInsert, StoreError> {
        let mut guard = self.lock()?;
        let recent = guard.recent(attempt.survey_id, &attempt.ip_hash, window_start);
        if recent.count >= u64::from(ceiling) {
            return Ok(LimitedInsert::Limited(recent));
        }
        guard.insert(attempt).map(LimitedInsert::Inserted)
    }

    fn count_recent(
        &self,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        window_start: Timestamp,
    ) -> Result<RecentIssuance, StoreError> {
        Ok(self.lock()?.recent(survey_id, ip_hash, window_start))
    }

    fn find_usable(
        &self,
        token: &AccessToken,
        now: Timestamp,
    ) -> Result<Option<SubmissionAttempt>, StoreError> {
        let guard = self.lock()?;
        let found = guard
            .tokens
            .get(token.as_str())
            .and_then(|id| guard.attempts.get(id))
            .filter(|attempt| attempt.is_usable(now))
            .cloned();
        drop(guard);
        Ok(found)
    }

    fn mark_completed(&self, id: AttemptId, now: Timestamp) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        let Some(attempt) = guard.attempts.get_mut(&id.get()) else {
            return Ok(false);
        };
        if attempt.status != AttemptStatus::Pending {
            return Ok(false);
        }
        attempt.status = AttemptStatus::Completed;
        attempt.completed_at = Some(now);
        drop(guard);
        Ok(true)
    }

    fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut guard = self.lock()?;
        let table = &mut *guard;
        let mut removed = 0_u64;
        table.attempts.retain(|_, attempt| {
            if attempt.is_purgeable(now) {
                table.tokens.remove(attempt.access_token.as_str());
                removed += 1;
                false
            } else {
                true
            }
        });
        drop(guard);
        Ok(removed)
    }

    fn survey_counts(
        &self,
        survey_id: SurveyId,
        now: Timestamp,
    ) -> Result<AttemptCounts, StoreError> {
        let guard = self.lock()?;
        let mut counts = AttemptCounts::default();
        for attempt in guard.attempts.values().filter(|attempt| attempt.survey_id == survey_id) {
            counts.total += 1;
            match attempt.status {
                AttemptStatus::Completed => counts.completed += 1,
                AttemptStatus::Pending if attempt.is_expired(now) => counts.expired += 1,
                AttemptStatus::Pending => counts.pending += 1,
            }
        }
        drop(guard);
        Ok(counts)
    }

    fn get(&self, id: AttemptId) -> Result<Option<SubmissionAttempt>, StoreError> {
        Ok(self.lock()?.attempts.get(&id.get()).cloned())
    }
}

// ============================================================================
// SECTION: In-Memory Survey Directory
// ============================================================================

/// In-memory survey directory.
#[derive(Debug, Default, Clone)]
pub struct InMemorySurveyDirectory {
    /// Surveys keyed by id.
    surveys: Arc<Mutex<BTreeMap<u64, SurveyRecord>>>,
}

impl InMemorySurveyDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a survey.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyLookupError`] when the directory lock is poisoned.
    pub fn upsert(&self, survey: SurveyRecord) -> Result<(), SurveyLookupError> {
        self.surveys
            .lock()
            .map_err(|_| SurveyLookupError::Io("survey directory mutex poisoned".to_string()))?
            .insert(survey.survey_id.get(), survey);
        Ok(())
    }

    /// Updates the status of an existing survey. Returns false when unknown.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyLookupError`] when the directory lock is poisoned.
    pub fn set_status(
        &self,
        survey_id: SurveyId,
        status: SurveyStatus,
    ) -> Result<bool, SurveyLookupError> {
        let mut guard = self
            .surveys
            .lock()
            .map_err(|_| SurveyLookupError::Io("survey directory mutex poisoned".to_string()))?;
        let Some(survey) = guard.get_mut(&survey_id.get()) else {
            return Ok(false);
        };
        survey.status = status;
        drop(guard);
        Ok(true)
    }
}

impl SurveyLookup for InMemorySurveyDirectory {
    fn survey(&self, survey_id: SurveyId) -> Result<Option<SurveyRecord>, SurveyLookupError> {
        let guard = self
            .surveys
            .lock()
            .map_err(|_| SurveyLookupError::Io("survey directory mutex poisoned".to_string()))?;
        Ok(guard.get(&survey_id.get()).cloned())
    }
}

// ============================================================================
// SECTION: Shared Wrappers
// ============================================================================

/// Shared submission store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedSubmissionStore {
    /// Inner store implementation.
    inner: Arc<dyn SubmissionStore + Send + Sync>,
}

impl SharedSubmissionStore {
    /// Wraps a submission store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl SubmissionStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn SubmissionStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl SubmissionStore for SharedSubmissionStore {
    fn insert_attempt(&self, attempt: &NewAttempt) -> Result<SubmissionAttempt, StoreError> {
        self.inner.insert_attempt(attempt)
    }

    fn insert_attempt_within_limit(
        &self,
        attempt: &NewAttempt,
        window_start: Timestamp,
        ceiling: u32,
    ) -> Result<LimitedInsert, StoreError> {
        self.inner.insert_attempt_within_limit(attempt, window_start, ceiling)
    }

    fn count_recent(
        &self,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        window_start: Timestamp,
    ) -> Result<RecentIssuance, StoreError> {
        self.inner.count_recent(survey_id, ip_hash, window_start)
    }

    fn find_usable(
        &self,
        token: &AccessToken,
        now: Timestamp,
    ) -> Result<Option<SubmissionAttempt>, StoreError> {
        self.inner.find_usable(token, now)
    }

    fn mark_completed(&self, id: AttemptId, now: Timestamp) -> Result<bool, StoreError> {
        self.inner.mark_completed(id, now)
    }

    fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        self.inner.purge_expired(now)
    }

    fn survey_counts(
        &self,
        survey_id: SurveyId,
        now: Timestamp,
    ) -> Result<AttemptCounts, StoreError> {
        self.inner.survey_counts(survey_id, now)
    }

    fn get(&self, id: AttemptId) -> Result<Option<SubmissionAttempt>, StoreError> {
        self.inner.get(id)
    }
}

/// Shared survey lookup backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedSurveyLookup {
    /// Inner lookup implementation.
    inner: Arc<dyn SurveyLookup + Send + Sync>,
}

impl SharedSurveyLookup {
    /// Wraps a survey lookup in a shared, clonable wrapper.
    #[must_use]
    pub fn from_lookup(lookup: impl SurveyLookup + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(lookup),
        }
    }

    /// Wraps an existing shared lookup.
    #[must_use]
    pub const fn new(lookup: Arc<dyn SurveyLookup + Send + Sync>) -> Self {
        Self {
            inner: lookup,
        }
    }
}

impl SurveyLookup for SharedSurveyLookup {
    fn survey(&self, survey_id: SurveyId) -> Result<Option<SurveyRecord>, SurveyLookupError> {
        self.inner.survey(survey_id)
    }
}
