// crates/survey-gate-config/src/lib.rs
// ============================================================================
// Module: Survey Gate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for survey-gate.toml semantics.
// Dependencies: survey-gate-core, survey-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `survey-gate-config` defines the configuration model for Survey Gate and
//! validates it strictly and fail-closed before the server or CLI build any
//! component from it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
