// crates/survey-gate-server/src/lib.rs
// ============================================================================
// Module: Survey Gate Server Library
// Description: HTTP surface, audit sinks, and reaper scheduling.
// Purpose: Expose the admission gate to anonymous respondents over HTTP.
// Dependencies: axum, tokio, survey-gate-config, survey-gate-core
// ============================================================================

//! ## Overview
//! `survey-gate-server` turns a validated [`SurveyGateConfig`] into a running
//! HTTP service. Admission semantics live in `survey-gate-core`; this crate
//! only maps them onto routes, status codes, and audit records.
//!
//! [`SurveyGateConfig`]: survey_gate_config::SurveyGateConfig

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod client_ip;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AdmissionAction;
pub use audit::AdmissionAuditEvent;
pub use audit::AuditEvent;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::PurgeAuditEvent;
pub use audit::StderrAuditSink;
pub use client_ip::client_address;
pub use server::Gate;
pub use server::ServerError;
pub use server::ServerState;
pub use server::SurveyGateServer;
pub use server::build_audit_sink;
pub use server::build_gate;
pub use server::purge_once;
pub use server::router;
pub use server::status_for;
