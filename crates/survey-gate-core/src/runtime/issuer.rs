// crates/survey-gate-core/src/runtime/issuer.rs
// ============================================================================
// Module: Survey Gate Token Issuer
// Description: Survey checks, rate limiting, and creation of pending attempts.
// Purpose: Hand out one access token per admitted submission attempt.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Issuance runs in a fixed order: survey lookup, status check, window check,
//! client hashing, rate limiting, token generation, and a single insert.
//! Client addresses and fingerprints are hashed before anything is stored.
//! A token collision reported by the store triggers regeneration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use crate::core::AccessToken;
use crate::core::AttemptId;
use crate::core::Clock;
use crate::core::NewAttempt;
use crate::core::SaltedHasher;
use crate::core::SurveyId;
use crate::core::SurveyRecord;
use crate::core::SurveyWindow;
use crate::core::Timestamp;
use crate::core::TokenGenerator;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SurveyLookup;
use crate::runtime::error::AdmissionError;
use crate::runtime::rate_limit::RateLimitEnforcement;
use crate::runtime::rate_limit::RateLimiter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
/// Token generation attempts before a collision is reported as a store error.
pub const MAX_TOKEN_ATTEMPTS: usize = 3;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Store-assigned attempt id.
    pub attempt_id: AttemptId,
    /// Survey the token admits to.
    pub survey_id: SurveyId,
    /// Bearer credential.
    pub token: AccessToken,
    /// Instant the token stops being usable.
    pub expires_at: Timestamp,
    /// Lifetime granted at issuance.
    pub expires_in: Duration,
}

// ============================================================================
// SECTION: Token Issuer
// ============================================================================

/// Issues access tokens for active surveys.
pub struct TokenIssuer<S, L, G> {
    /// Survey facts.
    lookup: L,
    /// Rate limiter over the submission store.
    limiter: RateLimiter<S>,
    /// Token source.
    generator: G,
    /// Client address and fingerprint hasher.
    hasher: SaltedHasher,
    /// Token lifetime.
    token_ttl: Duration,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl<S, L, G> TokenIssuer<S, L, G>
where
    S: SubmissionStore,
    L: SurveyLookup,
    G: TokenGenerator,
{
    /// Creates an issuer.
    #[must_use]
    pub fn new(
        lookup: L,
        limiter: RateLimiter<S>,
        generator: G,
        hasher: SaltedHasher,
        token_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lookup,
            limiter,
            generator,
            hasher,
            token_ttl,
            clock,
        }
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub const fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issues a token for `survey_id` on behalf of `client_ip`.
    ///
    /// `fingerprint` may be empty, in which case no fingerprint hash is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError`] when the survey does not admit responses,
    /// the client is rate limited, or persistence fails.
    pub fn issue(
        &self,
        survey_id: SurveyId,
        client_ip: &str,
        fingerprint: &str,
    ) -> Result<IssuedToken, AdmissionError> {
        let now = self.clock.now();
        let survey =
            self.lookup.survey(survey_id)?.ok_or(AdmissionError::SurveyNotFound(survey_id))?;
        ensure_accepting(&survey, now)?;

        let ip_hash = self.hasher.hash_client_ip(client_ip);
        if self.limiter.policy().enforcement == RateLimitEnforcement::BestEffort {
            self.limiter.check(survey_id, &ip_hash, now)?;
        }
        let fingerprint_hash = self.hasher.hash_fingerprint(fingerprint);
        let expires_at = now.saturating_add(self.token_ttl);

        let mut attempts_left = MAX_TOKEN_ATTEMPTS;
        loop {
            attempts_left -= 1;
            let attempt = NewAttempt {
                survey_id,
                access_token: self.generator.generate()?,
                ip_hash: ip_hash.clone(),
                fingerprint_hash: fingerprint_hash.clone(),
                created_at: now,
                expires_at,
            };
            match self.limiter.admit(&attempt, now) {
                Ok(stored) => {
                    return Ok(IssuedToken {
                        attempt_id: stored.id,
                        survey_id,
                        token: stored.access_token,
                        expires_at,
                        expires_in: self.token_ttl,
                    });
                }
                Err(AdmissionError::Store(StoreError::Conflict(_))) if attempts_left > 0 => {}
                Err(err) => return Err(err),
            }
        }
    }
}

/// Rejects issuance for surveys that are not active or outside their window.
fn ensure_accepting(survey: &SurveyRecord, now: Timestamp) -> Result<(), AdmissionError> {
    if !survey.is_active() {
        return Err(AdmissionError::SurveyNotActive);
    }
    match survey.window_at(now) {
        SurveyWindow::Open => Ok(()),
        SurveyWindow::NotOpenYet => Err(AdmissionError::SurveyNotOpenYet),
        SurveyWindow::Closed => Err(AdmissionError::SurveyClosed),
    }
}
