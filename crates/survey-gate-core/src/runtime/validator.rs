// crates/survey-gate-core/src/runtime/validator.rs
// ============================================================================
// Module: Survey Gate Token Validator
// Description: Read-only access token checks.
// Purpose: Confirm a token is usable and its survey still accepts responses.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Validation is one compound store read (token, pending status, and expiry
//! together) followed by a re-check of the survey, which may have been paused
//! or closed since issuance. Validation never mutates state.
//!
//! Security posture: unknown, expired, and consumed tokens all fail with the
//! same [`AdmissionError::InvalidOrExpiredToken`] so callers cannot probe
//! which tokens exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::AccessToken;
use crate::core::Clock;
use crate::core::MAX_TOKEN_LENGTH;
use crate::core::SubmissionAttempt;
use crate::core::SurveyWindow;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SurveyLookup;
use crate::runtime::error::AdmissionError;

// ============================================================================
// SECTION: Token Validator
// ============================================================================

/// Validates access tokens.
pub struct TokenValidator<S, L> {
    /// Submission store.
    store: S,
    /// Survey facts.
    lookup: L,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl<S, L> TokenValidator<S, L>
where
    S: SubmissionStore,
    L: SurveyLookup,
{
    /// Creates a validator.
    #[must_use]
    pub fn new(store: S, lookup: L, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            lookup,
            clock,
        }
    }

    /// Returns the pending attempt bound to `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::MissingToken`] for empty input,
    /// [`AdmissionError::InvalidOrExpiredToken`] when no usable attempt
    /// matches, and survey re-check errors when the survey stopped accepting
    /// responses.
    pub fn validate(&self, token: &str) -> Result<SubmissionAttempt, AdmissionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AdmissionError::MissingToken);
        }
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(AdmissionError::InvalidOrExpiredToken);
        }
        let now = self.clock.now();
        let attempt = self
            .store
            .find_usable(&AccessToken::new(token), now)?
            .ok_or(AdmissionError::InvalidOrExpiredToken)?;

        // Surveys are never hard-deleted while attempts reference them; a
        // missing record is treated as no longer active.
        let survey = self
            .lookup
            .survey(attempt.survey_id)?
            .ok_or(AdmissionError::SurveyNoLongerActive)?;
        if !survey.is_active() {
            return Err(AdmissionError::SurveyNoLongerActive);
        }
        match survey.window_at(now) {
            SurveyWindow::Open => Ok(attempt),
            SurveyWindow::NotOpenYet | SurveyWindow::Closed => {
                Err(AdmissionError::SubmissionWindowClosed)
            }
        }
    }
}
