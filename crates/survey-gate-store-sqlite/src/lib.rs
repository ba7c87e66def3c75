// crates/survey-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Submission Store
// Description: Durable SubmissionStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for submission attempts.
// Dependencies: survey-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`SubmissionStore`] and
//! [`SurveyLookup`] implementation. Every state change is one conditional SQL
//! statement, and the schema carries the unique token index and the
//! `(survey_id, ip_hash, created_at)` index the rate limiter counts against.
//!
//! [`SubmissionStore`]: survey_gate_core::SubmissionStore
//! [`SurveyLookup`]: survey_gate_core::SurveyLookup

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSubmissionStore;
pub use store::SqliteSyncMode;
