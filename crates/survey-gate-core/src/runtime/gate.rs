// crates/survey-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Survey Gate Facade
// Description: Wiring of issuer, validator, completion tracker, and reaper.
// Purpose: Give transports one entry point per admission operation.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`SubmissionGate`] owns one instance of each runtime component over shared
//! store and lookup handles. Its configuration is fixed at construction;
//! tests build a fresh gate per scenario instead of mutating settings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use crate::core::AttemptId;
use crate::core::Clock;
use crate::core::SaltedHasher;
use crate::core::SecureTokenGenerator;
use crate::core::SubmissionAttempt;
use crate::core::SubmissionStats;
use crate::core::SurveyId;
use crate::core::Timestamp;
use crate::core::TokenGenerator;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SurveyLookup;
use crate::runtime::completion::CompletionTracker;
use crate::runtime::error::AdmissionError;
use crate::runtime::issuer::DEFAULT_TOKEN_TTL;
use crate::runtime::issuer::IssuedToken;
use crate::runtime::issuer::TokenIssuer;
use crate::runtime::rate_limit::RateLimitPolicy;
use crate::runtime::rate_limit::RateLimiter;
use crate::runtime::reaper::ExpirationReaper;
use crate::runtime::validator::TokenValidator;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Admission settings fixed for the lifetime of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Token lifetime.
    pub token_ttl: Duration,
    /// Issuance rate limit.
    pub rate_limit: RateLimitPolicy,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            token_ttl: DEFAULT_TOKEN_TTL,
            rate_limit: RateLimitPolicy::default(),
        }
    }
}

/// Outcome of validating and completing a token in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemedSubmission {
    /// Completed attempt id.
    pub attempt_id: AttemptId,
    /// Survey the attempt belonged to.
    pub survey_id: SurveyId,
    /// Completion instant.
    pub completed_at: Timestamp,
}

// ============================================================================
// SECTION: Submission Gate
// ============================================================================

/// Admission control entry point.
pub struct SubmissionGate<S, L, G = SecureTokenGenerator> {
    /// Survey facts.
    lookup: L,
    /// Submission store.
    store: S,
    /// Token issuer.
    issuer: TokenIssuer<S, L, G>,
    /// Token validator.
    validator: TokenValidator<S, L>,
    /// Completion tracker.
    tracker: CompletionTracker<S>,
    /// Expiration reaper.
    reaper: ExpirationReaper<S>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Settings in force.
    config: AdmissionConfig,
}

impl<S, L> SubmissionGate<S, L, SecureTokenGenerator>
where
    S: SubmissionStore + Clone,
    L: SurveyLookup + Clone,
{
    /// Creates a gate that draws tokens from the OS random source.
    #[must_use]
    pub fn new(
        store: S,
        lookup: L,
        hasher: SaltedHasher,
        config: AdmissionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_generator(store, lookup, hasher, config, clock, SecureTokenGenerator)
    }
}

impl<S, L, G> SubmissionGate<S, L, G>
where
    S: SubmissionStore + Clone,
    L: SurveyLookup + Clone,
    G: TokenGenerator,
{
    /// Creates a gate with an explicit token generator.
    #[must_use]
    pub fn with_generator(
        store: S,
        lookup: L,
        hasher: SaltedHasher,
        config: AdmissionConfig,
        clock: Arc<dyn Clock>,
        generator: G,
    ) -> Self {
        let limiter = RateLimiter::new(store.clone(), config.rate_limit);
        let issuer = TokenIssuer::new(
            lookup.clone(),
            limiter,
            generator,
            hasher,
            config.token_ttl,
            Arc::clone(&clock),
        );
        let validator = TokenValidator::new(store.clone(), lookup.clone(), Arc::clone(&clock));
        let tracker = CompletionTracker::new(store.clone(), Arc::clone(&clock));
        let reaper = ExpirationReaper::new(store.clone(), Arc::clone(&clock));
        Self {
            lookup,
            store,
            issuer,
            validator,
            tracker,
            reaper,
            clock,
            config,
        }
    }

    /// Returns the settings in force.
    #[must_use]
    pub const fn config(&self) -> AdmissionConfig {
        self.config
    }

    /// Returns the submission store handle.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Issues an access token.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::issue`].
    pub fn issue_token(
        &self,
        survey_id: SurveyId,
        client_ip: &str,
        fingerprint: &str,
    ) -> Result<IssuedToken, AdmissionError> {
        self.issuer.issue(survey_id, client_ip, fingerprint)
    }

    /// Validates an access token without consuming it.
    ///
    /// # Errors
    ///
    /// See [`TokenValidator::validate`].
    pub fn validate(&self, token: &str) -> Result<SubmissionAttempt, AdmissionError> {
        self.validator.validate(token)
    }

    /// Completes an attempt by id.
    ///
    /// # Errors
    ///
    /// See [`CompletionTracker::complete`].
    pub fn complete(&self, attempt_id: AttemptId) -> Result<Timestamp, AdmissionError> {
        self.tracker.complete(attempt_id)
    }

    /// Validates `token` and completes its attempt.
    ///
    /// # Errors
    ///
    /// Returns validation errors, or
    /// [`AdmissionError::AlreadyCompletedOrNotFound`] when a concurrent caller
    /// completed the attempt first.
    pub fn redeem(&self, token: &str) -> Result<RedeemedSubmission, AdmissionError> {
        let attempt = self.validator.validate(token)?;
        let completed_at = self.tracker.complete(attempt.id)?;
        Ok(RedeemedSubmission {
            attempt_id: attempt.id,
            survey_id: attempt.survey_id,
            completed_at,
        })
    }

    /// Removes expired pending attempts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    pub fn purge_expired(&self) -> Result<u64, StoreError> {
        self.reaper.purge_expired()
    }

    /// Aggregates attempt statistics for an existing survey.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::SurveyNotFound`] for unknown surveys, or a
    /// lookup/store error.
    pub fn stats(&self, survey_id: SurveyId) -> Result<SubmissionStats, AdmissionError> {
        if self.lookup.survey(survey_id)?.is_none() {
            return Err(AdmissionError::SurveyNotFound(survey_id));
        }
        let counts = self.store.survey_counts(survey_id, self.clock.now())?;
        Ok(SubmissionStats::from(counts))
    }
}
