// crates/survey-gate-core/src/runtime/rate_limit.rs
// ============================================================================
// Module: Survey Gate Rate Limiter
// Description: Sliding-window issuance ceiling per survey and client hash.
// Purpose: Bound how many tokens one client address can obtain per survey.
// Dependencies: crate::{core, interfaces}, serde
// ============================================================================

//! ## Overview
//! The window is sliding: it covers every attempt created at or after
//! `now - window`, never a calendar bucket. Two enforcement modes exist:
//!
//! - [`RateLimitEnforcement::Strict`] counts and inserts in one store
//!   operation, so concurrent requests can never exceed the ceiling.
//! - [`RateLimitEnforcement::BestEffort`] counts first and inserts later.
//!   Concurrent requests that both observe `ceiling - 1` prior attempts are
//!   both admitted. This trades exact enforcement for one fewer lock or
//!   write transaction per issuance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::core::NewAttempt;
use crate::core::OpaqueHash;
use crate::core::SubmissionAttempt;
use crate::core::SurveyId;
use crate::core::Timestamp;
use crate::interfaces::LimitedInsert;
use crate::interfaces::RecentIssuance;
use crate::interfaces::SubmissionStore;
use crate::runtime::error::AdmissionError;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Default number of tokens per client address per survey per window.
pub const DEFAULT_RATE_LIMIT_CEILING: u32 = 3;
/// Default sliding window length.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60 * 60);
/// Smallest retry hint reported to clients.
const MIN_RETRY_AFTER: Duration = Duration::from_secs(1);

/// How the ceiling is enforced under concurrency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitEnforcement {
    /// Count and insert atomically.
    #[default]
    Strict,
    /// Count, then insert separately; may over-admit under races.
    BestEffort,
}

/// Issuance ceiling and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Maximum issuances per window.
    pub ceiling: u32,
    /// Sliding window length.
    pub window: Duration,
    /// Concurrency enforcement mode.
    pub enforcement: RateLimitEnforcement,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_RATE_LIMIT_CEILING,
            window: DEFAULT_RATE_LIMIT_WINDOW,
            enforcement: RateLimitEnforcement::Strict,
        }
    }
}

// ============================================================================
// SECTION: Rate Limiter
// ============================================================================

/// Applies a [`RateLimitPolicy`] against a submission store.
#[derive(Debug, Clone)]
pub struct RateLimiter<S> {
    /// Backing store.
    store: S,
    /// Active policy.
    policy: RateLimitPolicy,
}

impl<S: SubmissionStore> RateLimiter<S> {
    /// Creates a limiter over `store`.
    #[must_use]
    pub const fn new(store: S, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            policy,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Returns the first instant inside the window ending at `now`.
    #[must_use]
    pub fn window_start(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.policy.window)
    }

    /// Rejects when the client has already reached the ceiling.
    ///
    /// Only consulted in best-effort mode; strict mode defers the check to
    /// [`RateLimiter::admit`].
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::RateLimitExceeded`] at the ceiling, or a
    /// store error.
    pub fn check(
        &self,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        now: Timestamp,
    ) -> Result<(), AdmissionError> {
        let recent = self.store.count_recent(survey_id, ip_hash, self.window_start(now))?;
        if recent.count >= u64::from(self.policy.ceiling) {
            return Err(self.exceeded(recent, now));
        }
        Ok(())
    }

    /// Stores `attempt` under the configured enforcement mode.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::RateLimitExceeded`] when strict enforcement
    /// finds the ceiling reached, or a store error.
    pub fn admit(
        &self,
        attempt: &NewAttempt,
        now: Timestamp,
    ) -> Result<SubmissionAttempt, AdmissionError> {
        match self.policy.enforcement {
            RateLimitEnforcement::BestEffort => Ok(self.store.insert_attempt(attempt)?),
            RateLimitEnforcement::Strict => {
                match self.store.insert_attempt_within_limit(
                    attempt,
                    self.window_start(now),
                    self.policy.ceiling,
                )? {
                    LimitedInsert::Inserted(stored) => Ok(stored),
                    LimitedInsert::Limited(recent) => Err(self.exceeded(recent, now)),
                }
            }
        }
    }

    /// Builds the rejection, with the wait until the oldest attempt leaves the window.
    fn exceeded(&self, recent: RecentIssuance, now: Timestamp) -> AdmissionError {
        let retry_after = recent
            .oldest_created_at
            .map_or(self.policy.window, |oldest| {
                now.until(oldest.saturating_add(self.policy.window))
            })
            .max(MIN_RETRY_AFTER);
        AdmissionError::RateLimitExceeded {
            retry_after,
        }
    }
}
