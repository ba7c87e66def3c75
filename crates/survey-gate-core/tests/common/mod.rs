// crates/survey-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Admission Test Fixtures
// Description: Shared gate construction over in-memory backends.
// ============================================================================
//! ## Overview
//! Builds a fresh gate, store, survey directory, and manual clock per test.

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]
#![allow(clippy::unwrap_used, reason = "Fixtures use unwrap on static inputs.")]

use std::sync::Arc;
use std::time::Duration;

use survey_gate_core::AdmissionConfig;
use survey_gate_core::InMemorySubmissionStore;
use survey_gate_core::InMemorySurveyDirectory;
use survey_gate_core::ManualClock;
use survey_gate_core::RateLimitPolicy;
use survey_gate_core::SaltedHasher;
use survey_gate_core::SubmissionGate;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRecord;
use survey_gate_core::Timestamp;

/// Salt shared by every fixture.
pub const SALT: &str = "test-salt-0123456789abcdef";
/// 2026-01-01T00:00:00Z.
pub const START: Timestamp = Timestamp::from_unix_millis(1_767_225_600_000);
/// One hour.
pub const HOUR: Duration = Duration::from_secs(60 * 60);

/// Gate plus handles onto its backends.
pub struct Fixture {
    /// Gate under test.
    pub gate: SubmissionGate<InMemorySubmissionStore, InMemorySurveyDirectory>,
    /// Store shared with the gate.
    pub store: InMemorySubmissionStore,
    /// Survey directory shared with the gate.
    pub surveys: InMemorySurveyDirectory,
    /// Clock shared with the gate.
    pub clock: ManualClock,
}

/// Returns a survey id from a raw positive value.
pub fn survey_id(raw: u64) -> SurveyId {
    SurveyId::from_raw(raw).unwrap()
}

/// Returns the fixture hasher.
pub fn hasher() -> SaltedHasher {
    SaltedHasher::new(SALT).unwrap()
}

/// Builds a gate with default settings and one active survey (id 1).
pub fn fixture() -> Fixture {
    fixture_with(AdmissionConfig::default())
}

/// Builds a gate with a custom rate-limit ceiling.
pub fn fixture_with_ceiling(ceiling: u32) -> Fixture {
    fixture_with(AdmissionConfig {
        rate_limit: RateLimitPolicy {
            ceiling,
            ..RateLimitPolicy::default()
        },
        ..AdmissionConfig::default()
    })
}

/// Builds a gate with `config` and one active survey (id 1).
pub fn fixture_with(config: AdmissionConfig) -> Fixture {
    let store = InMemorySubmissionStore::new();
    let surveys = InMemorySurveyDirectory::new();
    surveys.upsert(SurveyRecord::active(survey_id(1))).unwrap();
    let clock = ManualClock::new(START);
    let gate = SubmissionGate::new(
        store.clone(),
        surveys.clone(),
        hasher(),
        config,
        Arc::new(clock.clone()),
    );
    Fixture {
        gate,
        store,
        surveys,
        clock,
    }
}
