// crates/survey-gate-core/src/core/mod.rs
// ============================================================================
// Module: Survey Gate Core Types
// Description: Canonical admission-control domain types.
// Purpose: Provide stable, serializable types shared by every backend.
// Dependencies: base64, rand, serde, sha2, time
// ============================================================================

//! ## Overview
//! Core types define identifiers, timestamps, submission attempts, survey
//! facts, statistics, the anonymizing hasher, and access tokens. These types
//! are the canonical source of truth for the HTTP surface and store schemas.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod attempt;
pub mod clock;
pub mod hashing;
pub mod identifiers;
pub mod stats;
pub mod survey;
pub mod token;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use attempt::AttemptStatus;
pub use attempt::NewAttempt;
pub use attempt::SubmissionAttempt;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use clock::TimeError;
pub use clock::Timestamp;
pub use hashing::HashError;
pub use hashing::MIN_SALT_BYTES;
pub use hashing::OpaqueHash;
pub use hashing::SaltedHasher;
pub use identifiers::AttemptId;
pub use identifiers::IdentifierError;
pub use identifiers::SurveyId;
pub use stats::AttemptCounts;
pub use stats::SubmissionStats;
pub use survey::SurveyRecord;
pub use survey::SurveyStatus;
pub use survey::SurveyWindow;
pub use token::AccessToken;
pub use token::MAX_TOKEN_LENGTH;
pub use token::SecureTokenGenerator;
pub use token::TokenError;
pub use token::TokenGenerator;
