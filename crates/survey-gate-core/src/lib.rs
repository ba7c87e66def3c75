// crates/survey-gate-core/src/lib.rs
// ============================================================================
// Module: Survey Gate Core Library
// Description: Public API surface for anonymous submission admission control.
// Purpose: Expose core types, interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Survey Gate decides whether an anonymous client may start a survey
//! submission. It issues single-use access tokens, rate limits issuance per
//! salted client address, validates tokens, completes submissions at most once,
//! and purges expired tokens. It is storage-agnostic and integrates through
//! the [`SubmissionStore`] and [`SurveyLookup`] interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::LimitedInsert;
pub use interfaces::RecentIssuance;
pub use interfaces::StoreError;
pub use interfaces::SubmissionStore;
pub use interfaces::SurveyLookup;
pub use interfaces::SurveyLookupError;
pub use runtime::AdmissionConfig;
pub use runtime::AdmissionError;
pub use runtime::CompletionTracker;
pub use runtime::DEFAULT_RATE_LIMIT_CEILING;
pub use runtime::DEFAULT_RATE_LIMIT_WINDOW;
pub use runtime::DEFAULT_TOKEN_TTL;
pub use runtime::ErrorClass;
pub use runtime::ExpirationReaper;
pub use runtime::InMemorySubmissionStore;
pub use runtime::InMemorySurveyDirectory;
pub use runtime::IssuedToken;
pub use runtime::RateLimitEnforcement;
pub use runtime::RateLimitPolicy;
pub use runtime::RateLimiter;
pub use runtime::RedeemedSubmission;
pub use runtime::SharedSubmissionStore;
pub use runtime::SharedSurveyLookup;
pub use runtime::SubmissionGate;
pub use runtime::TokenIssuer;
pub use runtime::TokenValidator;
