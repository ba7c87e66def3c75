// crates/survey-gate-server/src/audit.rs
// ============================================================================
// Module: Admission Audit Logging
// Description: Structured audit events for admission requests and purges.
// Purpose: Emit JSON-lines audit records without identifying data.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every HTTP admission request and every reaper run produces one audit event.
//! Events are serialized as JSON lines and routed through an [`AuditSink`].
//!
//! Security posture: events carry survey ids, outcomes and error kinds only.
//! Client addresses, fingerprints, hashes and tokens never reach a sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Admission action labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionAction {
    /// Token issuance.
    IssueToken,
    /// Token validation.
    ValidateToken,
    /// Submission completion.
    CompleteSubmission,
    /// Survey statistics read.
    ReadStats,
}

impl AdmissionAction {
    /// Returns a stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IssueToken => "issue_token",
            Self::ValidateToken => "validate_token",
            Self::CompleteSubmission => "complete_submission",
            Self::ReadStats => "read_stats",
        }
    }
}

/// Admission request audit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionAuditEvent {
    /// Event time in unix milliseconds.
    pub timestamp_ms: i64,
    /// Requested action.
    pub action: AdmissionAction,
    /// Survey id when known.
    pub survey_id: Option<u64>,
    /// `ok` or `error`.
    pub outcome: &'static str,
    /// Error kind label on failure.
    pub error_kind: Option<&'static str>,
    /// HTTP status returned.
    pub http_status: u16,
    /// Backend failure text for server-side errors; never sent to clients.
    pub detail: Option<String>,
}

/// Expiration purge audit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeAuditEvent {
    /// Event time in unix milliseconds.
    pub timestamp_ms: i64,
    /// Attempts removed, when the purge succeeded.
    pub removed: Option<u64>,
    /// Failure description, when the purge failed.
    pub error: Option<String>,
}

/// Audit event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// One HTTP admission request.
    AdmissionRequest(AdmissionAuditEvent),
    /// One reaper run.
    ExpirationPurge(PurgeAuditEvent),
}

// ============================================================================
// SECTION: Audit Sinks
// ============================================================================

/// Audit sink for admission events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink writing JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(&mut stderr, "{payload}");
        }
    }
}

/// Audit sink appending JSON lines to a file.
pub struct FileAuditSink {
    /// Open file handle, serialized across writers.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens (or creates) an append-only audit log.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut guard) = self.file.lock() {
            let _ = writeln!(&mut *guard, "{payload}");
            let _ = guard.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}
