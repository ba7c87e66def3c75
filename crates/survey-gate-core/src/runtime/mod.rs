// crates/survey-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Survey Gate Runtime
// Description: Admission components and in-memory backends.
// Purpose: Execute issuance, validation, completion, and purging over stores.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components are stateless beyond their configuration; all shared
//! state lives behind [`crate::interfaces::SubmissionStore`]. Every transport
//! calls through [`SubmissionGate`] so behavior stays identical across them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod completion;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod rate_limit;
pub mod reaper;
pub mod store;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use completion::CompletionTracker;
pub use error::AdmissionError;
pub use error::ErrorClass;
pub use gate::AdmissionConfig;
pub use gate::RedeemedSubmission;
pub use gate::SubmissionGate;
pub use issuer::DEFAULT_TOKEN_TTL;
pub use issuer::IssuedToken;
pub use issuer::MAX_TOKEN_ATTEMPTS;
pub use issuer::TokenIssuer;
pub use rate_limit::DEFAULT_RATE_LIMIT_CEILING;
pub use rate_limit::DEFAULT_RATE_LIMIT_WINDOW;
pub use rate_limit::RateLimitEnforcement;
pub use rate_limit::RateLimitPolicy;
pub use rate_limit::RateLimiter;
pub use reaper::ExpirationReaper;
pub use store::InMemorySubmissionStore;
pub use store::InMemorySurveyDirectory;
pub use store::SharedSubmissionStore;
pub use store::SharedSurveyLookup;
pub use validator::TokenValidator;
