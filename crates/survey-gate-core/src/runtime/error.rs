// crates/survey-gate-core/src/runtime/error.rs
// ============================================================================
// Module: Survey Gate Admission Errors
// Description: Closed error taxonomy for issuance, validation, and completion.
// Purpose: Let transports map outcomes exhaustively without inspecting text.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Every admission outcome other than success is an [`AdmissionError`]
//! variant. [`AdmissionError::kind`] yields a stable machine label and
//! [`AdmissionError::class`] groups variants into input, domain, and
//! persistence failures.
//!
//! Security posture: [`AdmissionError::InvalidOrExpiredToken`] deliberately
//! covers unknown, expired, and already-used tokens alike.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::SurveyId;
use crate::core::TokenError;
use crate::interfaces::StoreError;
use crate::interfaces::SurveyLookupError;

// ============================================================================
// SECTION: Error Class
// ============================================================================

/// Coarse grouping of admission errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed client input.
    Input,
    /// Expected rejection given current state.
    Domain,
    /// Backend or entropy failure.
    Persistence,
}

// ============================================================================
// SECTION: Admission Error
// ============================================================================

/// Admission control failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// No token was supplied.
    #[error("access token is required")]
    MissingToken,
    /// Survey does not exist.
    #[error("survey not found: {0}")]
    SurveyNotFound(SurveyId),
    /// Survey status does not admit responses.
    #[error("survey is not active")]
    SurveyNotActive,
    /// Survey opening instant is in the future.
    #[error("survey has not opened yet")]
    SurveyNotOpenYet,
    /// Survey closing instant has passed.
    #[error("survey is closed")]
    SurveyClosed,
    /// Issuance ceiling reached for this client within the window.
    #[error("too many tokens requested; retry in {}s", retry_after.as_secs())]
    RateLimitExceeded {
        /// Time until the oldest in-window issuance leaves the window.
        retry_after: Duration,
    },
    /// Token unknown, expired, or already used.
    #[error("invalid or expired access token")]
    InvalidOrExpiredToken,
    /// Survey stopped admitting responses after the token was issued.
    #[error("survey is no longer active")]
    SurveyNoLongerActive,
    /// Survey window ended after the token was issued.
    #[error("survey submission window has closed")]
    SubmissionWindowClosed,
    /// Attempt already completed, expired and purged, or never existed.
    #[error("submission already completed or not found")]
    AlreadyCompletedOrNotFound,
    /// Token generation failed.
    #[error(transparent)]
    TokenGeneration(#[from] TokenError),
    /// Submission store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Survey lookup failed.
    #[error(transparent)]
    Lookup(#[from] SurveyLookupError),
}

impl AdmissionError {
    /// Returns a stable snake_case label for the error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::SurveyNotFound(_) => "survey_not_found",
            Self::SurveyNotActive => "survey_not_active",
            Self::SurveyNotOpenYet => "survey_not_open_yet",
            Self::SurveyClosed => "survey_closed",
            Self::RateLimitExceeded {
                ..
            } => "rate_limit_exceeded",
            Self::InvalidOrExpiredToken => "invalid_or_expired_token",
            Self::SurveyNoLongerActive => "survey_no_longer_active",
            Self::SubmissionWindowClosed => "submission_window_closed",
            Self::AlreadyCompletedOrNotFound => "already_completed_or_not_found",
            Self::TokenGeneration(_) => "token_generation_failed",
            Self::Store(_) => "store_error",
            Self::Lookup(_) => "survey_lookup_error",
        }
    }

    /// Returns the error class.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingToken => ErrorClass::Input,
            Self::TokenGeneration(_) | Self::Store(_) | Self::Lookup(_) => ErrorClass::Persistence,
            Self::SurveyNotFound(_)
            | Self::SurveyNotActive
            | Self::SurveyNotOpenYet
            | Self::SurveyClosed
            | Self::RateLimitExceeded {
                ..
            }
            | Self::InvalidOrExpiredToken
            | Self::SurveyNoLongerActive
            | Self::SubmissionWindowClosed
            | Self::AlreadyCompletedOrNotFound => ErrorClass::Domain,
        }
    }

    /// Returns the retry hint for rate-limited requests.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded {
                retry_after,
            } => Some(*retry_after),
            _ => None,
        }
    }
}
