// crates/survey-gate-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite SubmissionStore and SurveyLookup behavior.
// Purpose: Ensure durable persistence and single-statement state changes.
// Dependencies: survey-gate-store-sqlite, survey-gate-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed submission store. Exercises
//! persistence across reopen, schema versioning, token uniqueness, the
//! compound validation predicate, and concurrent completion and issuance.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::params;
use survey_gate_core::AccessToken;
use survey_gate_core::AdmissionConfig;
use survey_gate_core::AdmissionError;
use survey_gate_core::AttemptStatus;
use survey_gate_core::LimitedInsert;
use survey_gate_core::ManualClock;
use survey_gate_core::NewAttempt;
use survey_gate_core::RateLimitPolicy;
use survey_gate_core::SaltedHasher;
use survey_gate_core::StoreError;
use survey_gate_core::SubmissionGate;
use survey_gate_core::SubmissionStore;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyLookup;
use survey_gate_core::SurveyLookupError;
use survey_gate_core::SurveyRecord;
use survey_gate_core::SurveyStatus;
use survey_gate_core::Timestamp;
use survey_gate_store_sqlite::SqliteStoreConfig;
use survey_gate_store_sqlite::SqliteStoreError;
use survey_gate_store_sqlite::SqliteSubmissionStore;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const START: Timestamp = Timestamp::from_unix_millis(1_767_225_600_000);
const HOUR: Duration = Duration::from_secs(3_600);

fn survey_id(raw: u64) -> SurveyId {
    SurveyId::from_raw(raw).unwrap()
}

fn open(dir: &TempDir) -> SqliteSubmissionStore {
    let store = SqliteSubmissionStore::new(&SqliteStoreConfig::at(dir.path().join("gate.db")))
        .expect("open store");
    store.upsert_survey(&SurveyRecord::active(survey_id(1))).unwrap();
    store
}

fn new_attempt(token: &str, ip: &str, created_at: Timestamp) -> NewAttempt {
    let hasher = SaltedHasher::new("sqlite-test-salt-0123456789").unwrap();
    NewAttempt {
        survey_id: survey_id(1),
        access_token: AccessToken::new(token),
        ip_hash: hasher.hash(ip),
        fingerprint_hash: hasher.hash_fingerprint("fp"),
        created_at,
        expires_at: created_at.saturating_add(HOUR),
    }
}

fn gate(
    store: &SqliteSubmissionStore,
    ceiling: u32,
    clock: &ManualClock,
) -> SubmissionGate<SqliteSubmissionStore, SqliteSubmissionStore> {
    SubmissionGate::new(
        store.clone(),
        store.clone(),
        SaltedHasher::new("sqlite-test-salt-0123456789").unwrap(),
        AdmissionConfig {
            rate_limit: RateLimitPolicy {
                ceiling,
                ..RateLimitPolicy::default()
            },
            ..AdmissionConfig::default()
        },
        Arc::new(clock.clone()),
    )
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Tests attempts and surveys survive reopening the database.
#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let inserted = open(&dir).insert_attempt(&new_attempt("sgt_a", "10.0.0.1", START)).unwrap();

    let reopened = open(&dir);
    let loaded = reopened.get(inserted.id).unwrap().unwrap();
    assert_eq!(loaded, inserted);
    assert_eq!(loaded.status, AttemptStatus::Pending);
    assert!(reopened.survey(survey_id(1)).unwrap().unwrap().is_active());
}

/// Tests an unknown schema version fails closed.
#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let dir = TempDir::new().unwrap();
    drop(open(&dir));
    let conn = Connection::open(dir.path().join("gate.db")).unwrap();
    conn.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(conn);

    let result = SqliteSubmissionStore::new(&SqliteStoreConfig::at(dir.path().join("gate.db")));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

/// Tests a directory path is refused.
#[test]
fn sqlite_store_rejects_directory_path() {
    let dir = TempDir::new().unwrap();
    let result = SqliteSubmissionStore::new(&SqliteStoreConfig::at(dir.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

/// Tests an empty path is refused as invalid before touching the filesystem.
#[test]
fn sqlite_store_rejects_empty_path() {
    let result = SqliteSubmissionStore::new(&SqliteStoreConfig::at(""));
    match result {
        Err(SqliteStoreError::Invalid(message)) => assert!(message.contains("non-empty")),
        other => panic!("expected invalid store path, got {:?}", other.err()),
    }
}

// ============================================================================
// SECTION: Attempts
// ============================================================================

/// Tests duplicate tokens surface as conflicts.
#[test]
fn sqlite_store_reports_token_conflict() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.insert_attempt(&new_attempt("sgt_dup", "10.0.0.1", START)).unwrap();
    let err = store.insert_attempt(&new_attempt("sgt_dup", "10.0.0.2", START)).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

/// Tests the usable predicate covers token, status, and expiry at once.
#[test]
fn sqlite_store_find_usable_predicate() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let inserted = store.insert_attempt(&new_attempt("sgt_a", "10.0.0.1", START)).unwrap();
    let token = AccessToken::new("sgt_a");

    assert!(store.find_usable(&token, START).unwrap().is_some());
    let last_ms = START.saturating_add(HOUR - Duration::from_millis(1));
    assert!(store.find_usable(&token, last_ms).unwrap().is_some());
    assert!(store.find_usable(&token, START.saturating_add(HOUR)).unwrap().is_none());

    assert!(store.mark_completed(inserted.id, START).unwrap());
    assert!(store.find_usable(&token, START).unwrap().is_none());
    assert!(!store.mark_completed(inserted.id, START).unwrap());
    let completed = store.get(inserted.id).unwrap().unwrap();
    assert_eq!(completed.completed_at, Some(START));
}

/// Tests purge deletes only pending attempts strictly past expiry.
#[test]
fn sqlite_store_purges_expired_pending_only() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let done = store.insert_attempt(&new_attempt("sgt_done", "10.0.0.1", START)).unwrap();
    store.mark_completed(done.id, START).unwrap();
    let stale = store.insert_attempt(&new_attempt("sgt_stale", "10.0.0.2", START)).unwrap();
    let fresh = store
        .insert_attempt(&new_attempt("sgt_fresh", "10.0.0.3", START.saturating_add(HOUR)))
        .unwrap();

    assert_eq!(store.purge_expired(START.saturating_add(HOUR)).unwrap(), 0);
    let later = START.saturating_add(HOUR + Duration::from_millis(1));
    let counts = store.survey_counts(survey_id(1), later).unwrap();
    assert_eq!((counts.total, counts.completed, counts.pending, counts.expired), (3, 1, 1, 1));

    assert_eq!(store.purge_expired(later).unwrap(), 1);
    assert!(store.get(done.id).unwrap().is_some());
    assert!(store.get(stale.id).unwrap().is_none());
    assert!(store.get(fresh.id).unwrap().is_some());
}

/// Tests the strict insert refuses at the ceiling and reports the oldest issuance.
#[test]
fn sqlite_store_insert_within_limit() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let window_start = START.saturating_sub(HOUR);
    for (minute, token) in [(0_u64, "sgt_1"), (1, "sgt_2")] {
        let created = START.saturating_add(Duration::from_secs(60 * minute));
        let outcome = store
            .insert_attempt_within_limit(&new_attempt(token, "10.0.0.1", created), window_start, 2)
            .unwrap();
        assert!(matches!(outcome, LimitedInsert::Inserted(_)));
    }
    let outcome = store
        .insert_attempt_within_limit(&new_attempt("sgt_3", "10.0.0.1", START), window_start, 2)
        .unwrap();
    match outcome {
        LimitedInsert::Limited(recent) => {
            assert_eq!(recent.count, 2);
            assert_eq!(recent.oldest_created_at, Some(START));
        }
        LimitedInsert::Inserted(_) => panic!("ceiling should refuse the third insert"),
    }
}

// ============================================================================
// SECTION: Surveys
// ============================================================================

/// Tests survey status updates and malformed rows.
#[test]
fn sqlite_store_survey_lookup() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    assert!(store.survey(survey_id(2)).unwrap().is_none());
    assert!(store.set_survey_status(survey_id(1), SurveyStatus::Closed).unwrap());
    assert!(!store.set_survey_status(survey_id(2), SurveyStatus::Closed).unwrap());
    assert_eq!(store.survey(survey_id(1)).unwrap().unwrap().status, SurveyStatus::Closed);

    let conn = Connection::open(dir.path().join("gate.db")).unwrap();
    conn.execute("INSERT INTO surveys (survey_id, status) VALUES (3, 'bogus')", params![])
        .unwrap();
    drop(conn);
    assert!(matches!(store.survey(survey_id(3)), Err(SurveyLookupError::Invalid(_))));
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

/// Tests concurrent completions of one attempt succeed exactly once.
#[test]
fn sqlite_store_concurrent_completion() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let inserted = store.insert_attempt(&new_attempt("sgt_a", "10.0.0.1", START)).unwrap();
    let barrier = Barrier::new(8);
    let successes = thread::scope(|scope| {
        let handles: Vec<_> = (0 .. 8)
            .map(|_| {
                let store = store.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    store.mark_completed(inserted.id, START).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).filter(|ok| *ok).count()
    });
    assert_eq!(successes, 1);
}

/// Tests strict issuance never exceeds the ceiling under concurrency.
#[test]
fn sqlite_gate_strict_rate_limit_under_concurrency() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let clock = ManualClock::new(START);
    let gate = gate(&store, 3, &clock);
    let barrier = Barrier::new(8);
    let outcomes: Vec<Result<_, AdmissionError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0 .. 8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    gate.issue_token(survey_id(1), "203.0.113.7", "")
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 3);
    assert_eq!(store.survey_counts(survey_id(1), START).unwrap().total, 3);
}

/// Tests a full lifecycle through the gate over SQLite.
#[test]
fn sqlite_gate_lifecycle() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let clock = ManualClock::new(START);
    let gate = gate(&store, 3, &clock);

    let issued = gate.issue_token(survey_id(1), "203.0.113.7", "").unwrap();
    let redeemed = gate.redeem(issued.token.as_str()).unwrap();
    assert_eq!(redeemed.attempt_id, issued.attempt_id);
    assert_eq!(
        gate.complete(issued.attempt_id).unwrap_err(),
        AdmissionError::AlreadyCompletedOrNotFound
    );

    let abandoned = gate.issue_token(survey_id(1), "203.0.113.7", "").unwrap();
    clock.advance(HOUR * 2);
    assert_eq!(
        gate.validate(abandoned.token.as_str()).unwrap_err(),
        AdmissionError::InvalidOrExpiredToken
    );
    assert_eq!(gate.purge_expired().unwrap(), 1);
    let stats = gate.stats(survey_id(1)).unwrap();
    assert_eq!((stats.total, stats.completed, stats.unique_participants), (1, 1, 1));
}
