// crates/survey-gate-server/src/server/tests.rs
// ============================================================================
// Module: Survey Gate Server Unit Tests
// Description: Handler, status mapping, and audit tests.
// Purpose: Validate HTTP behavior with in-memory backends and a manual clock.
// Dependencies: survey-gate-server
// ============================================================================

//! ## Overview
//! Invokes handlers directly with in-memory fixtures and checks status codes,
//! bodies, headers, and the audit trail.
//!
//! Security posture: tests exercise untrusted request handling.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only handler assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::body::Bytes;
use axum::body::to_bytes;
use axum::extract::ConnectInfo;
use axum::extract::Path as UrlPath;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::RETRY_AFTER;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::Value;
use survey_gate_core::AccessToken;
use survey_gate_core::AdmissionConfig;
use survey_gate_core::AdmissionError;
use survey_gate_core::Clock;
use survey_gate_core::InMemorySubmissionStore;
use survey_gate_core::InMemorySurveyDirectory;
use survey_gate_core::ManualClock;
use survey_gate_core::RateLimitPolicy;
use survey_gate_core::SaltedHasher;
use survey_gate_core::SharedSubmissionStore;
use survey_gate_core::SharedSurveyLookup;
use survey_gate_core::StoreError;
use survey_gate_core::SubmissionGate;
use survey_gate_core::SubmissionStore;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRecord;
use survey_gate_core::SurveyStatus;
use survey_gate_core::Timestamp;

use super::ServerState;
use super::handle_complete;
use super::handle_health;
use super::handle_issue_token;
use super::handle_stats;
use super::handle_validate;
use super::purge_once;
use super::status_for;
use crate::audit::AdmissionAction;
use crate::audit::AuditEvent;
use crate::audit::AuditSink;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const SALT: &str = "server-test-salt-0123456789";
const START: Timestamp = Timestamp::from_unix_millis(1_767_225_600_000);
const ADMIN_TOKEN: &str = "admin-token-0123456789";

#[derive(Default)]
struct TestAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditSink for TestAudit {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

impl TestAudit {
    fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

struct Harness {
    state: ServerState,
    store: InMemorySubmissionStore,
    surveys: InMemorySurveyDirectory,
    clock: ManualClock,
    audit: Arc<TestAudit>,
}

struct HarnessOptions {
    ceiling: u32,
    admin_token: Option<String>,
    trust_forwarded_headers: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            ceiling: 3,
            admin_token: None,
            trust_forwarded_headers: false,
        }
    }
}

fn harness() -> Harness {
    harness_with(HarnessOptions::default())
}

fn harness_with(options: HarnessOptions) -> Harness {
    let store = InMemorySubmissionStore::new();
    let surveys = InMemorySurveyDirectory::new();
    surveys.upsert(SurveyRecord::active(survey(1))).unwrap();
    let clock = ManualClock::new(START);
    let config = AdmissionConfig {
        rate_limit: RateLimitPolicy {
            ceiling: options.ceiling,
            ..RateLimitPolicy::default()
        },
        ..AdmissionConfig::default()
    };
    let gate = SubmissionGate::new(
        SharedSubmissionStore::from_store(store.clone()),
        SharedSurveyLookup::from_lookup(surveys.clone()),
        SaltedHasher::new(SALT).unwrap(),
        config,
        Arc::new(clock.clone()),
    );
    let audit = Arc::new(TestAudit::default());
    let state = ServerState::new(
        Arc::new(gate),
        Arc::clone(&audit) as Arc<dyn AuditSink>,
        Arc::new(clock.clone()),
        options.admin_token,
        options.trust_forwarded_headers,
    );
    Harness {
        state,
        store,
        surveys,
        clock,
        audit,
    }
}

fn survey(raw: u64) -> SurveyId {
    SurveyId::from_raw(raw).unwrap()
}

fn peer() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 51_000)))
}

async fn issue(harness: &Harness, survey_id: &str, headers: HeaderMap, body: &str) -> Response {
    handle_issue_token(
        State(harness.state.clone()),
        peer(),
        UrlPath(survey_id.to_string()),
        headers,
        Bytes::from(body.to_string()),
    )
    .await
}

async fn issued_token(harness: &Harness) -> String {
    let response = issue(harness, "1", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

async fn validate(harness: &Harness, token: &str) -> Response {
    let body = serde_json::json!({ "token": token }).to_string();
    handle_validate(State(harness.state.clone()), Bytes::from(body)).await
}

async fn complete(harness: &Harness, token: &str) -> Response {
    let body = serde_json::json!({ "token": token }).to_string();
    handle_complete(State(harness.state.clone()), Bytes::from(body)).await
}

async fn stats(harness: &Harness, survey_id: &str, headers: HeaderMap) -> Response {
    handle_stats(State(harness.state.clone()), UrlPath(survey_id.to_string()), headers).await
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("response body bytes");
    serde_json::from_slice(&bytes).expect("response body json")
}

async fn error_code(response: Response) -> String {
    let body = body_json(response).await;
    body["error"]["code"].as_str().expect("error code").to_string()
}

fn forwarded(ip: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static(ip));
    headers
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
    headers
}

// ============================================================================
// SECTION: Health
// ============================================================================

#[tokio::test]
async fn health_endpoint_ok() {
    let response = handle_health().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(CONTENT_TYPE).expect("content type");
    assert_eq!(content_type, "application/json");
    assert_eq!(body_json(response).await["status"], "ok");
}

// ============================================================================
// SECTION: Issuance
// ============================================================================

#[tokio::test]
async fn issue_returns_token_and_expiry() {
    let harness = harness();
    let response = issue(&harness, "1", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].as_str().unwrap().starts_with("sgt_"));
    assert_eq!(body["expiresInSeconds"], 3_600);
    let expires_at = Timestamp::parse_rfc3339(body["expiresAt"].as_str().unwrap()).unwrap();
    assert_eq!(expires_at, START.saturating_add(Duration::from_secs(3_600)));
}

#[tokio::test]
async fn issue_accepts_fingerprint_body() {
    let harness = harness();
    let response = issue(&harness, "1", HeaderMap::new(), r#"{"fingerprint":"fp-1"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let attempt = harness
        .store
        .find_usable(&AccessToken::new(token), harness.clock.now())
        .unwrap()
        .unwrap();
    assert!(attempt.fingerprint_hash.is_some());
}

#[tokio::test]
async fn issue_rejects_bad_survey_id() {
    let harness = harness();

    let response = issue(&harness, "abc", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "invalid_survey_id");

    let response = issue(&harness, "0", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

}

#[tokio::test]
async fn issue_treats_undecodable_body_as_empty() {
    let harness = harness();

    let response = issue(&harness, "1", HeaderMap::new(), "{not json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["token"].as_str().unwrap().starts_with("sgt_"));

    let response = issue(&harness, "1", HeaderMap::new(), "[1, 2]").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = handle_validate(State(harness.state.clone()), Bytes::from("{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "invalid_body");

    let response = handle_complete(State(harness.state.clone()), Bytes::from("{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "invalid_body");
}

#[tokio::test]
async fn issue_maps_survey_state_errors() {
    let harness = harness();

    let response = issue(&harness, "99", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "survey_not_found");

    harness.surveys.set_status(survey(1), SurveyStatus::Paused).unwrap();
    let response = issue(&harness, "1", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "survey_not_active");
}

#[tokio::test]
async fn rate_limit_returns_429_with_retry_after() {
    let harness = harness();
    for _ in 0 .. 3 {
        assert_eq!(issue(&harness, "1", HeaderMap::new(), "").await.status(), StatusCode::OK);
    }
    harness.clock.advance(Duration::from_secs(600));

    let response = issue(&harness, "1", HeaderMap::new(), "").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "3000");
    assert_eq!(error_code(response).await, "rate_limit_exceeded");
}

#[tokio::test]
async fn forwarded_headers_key_the_limit_only_when_trusted() {
    let trusting = harness_with(HarnessOptions {
        ceiling: 1,
        trust_forwarded_headers: true,
        ..HarnessOptions::default()
    });
    assert_eq!(issue(&trusting, "1", forwarded("203.0.113.1"), "").await.status(), StatusCode::OK);
    assert_eq!(issue(&trusting, "1", forwarded("203.0.113.2"), "").await.status(), StatusCode::OK);

    let untrusting = harness_with(HarnessOptions {
        ceiling: 1,
        ..HarnessOptions::default()
    });
    assert_eq!(
        issue(&untrusting, "1", forwarded("203.0.113.1"), "").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        issue(&untrusting, "1", forwarded("203.0.113.2"), "").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

// ============================================================================
// SECTION: Validation and Completion
// ============================================================================

#[tokio::test]
async fn validate_reports_attempt_without_consuming() {
    let harness = harness();
    let token = issued_token(&harness).await;

    for _ in 0 .. 2 {
        let response = validate(&harness, &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["surveyId"], 1);
        assert_eq!(body["submissionId"], 1);
    }
}

#[tokio::test]
async fn validate_maps_token_errors() {
    let harness = harness();

    let response = handle_validate(State(harness.state.clone()), Bytes::new()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "missing_token");

    let response = validate(&harness, "sgt_unknown").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_or_expired_token");

    let token = issued_token(&harness).await;
    harness.surveys.set_status(survey(1), SurveyStatus::Closed).unwrap();
    let response = validate(&harness, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(response).await, "survey_no_longer_active");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let harness = harness();
    let token = issued_token(&harness).await;
    harness.clock.advance(Duration::from_secs(3_600));

    let response = validate(&harness, &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn complete_is_single_use() {
    let harness = harness();
    let token = issued_token(&harness).await;

    let response = complete(&harness, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["submissionId"], 1);
    let completed_at = Timestamp::parse_rfc3339(body["completedAt"].as_str().unwrap()).unwrap();
    assert_eq!(completed_at, START);

    let response = complete(&harness, &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// SECTION: Stats
// ============================================================================

#[tokio::test]
async fn stats_are_open_without_admin_token() {
    let harness = harness();
    let token = issued_token(&harness).await;
    issued_token(&harness).await;
    assert_eq!(complete(&harness, &token).await.status(), StatusCode::OK);

    let response = stats(&harness, "1", HeaderMap::new()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["completed"], 1);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["expired"], 0);
    assert_eq!(body["completionRate"], 50.0);
    assert_eq!(body["uniqueParticipants"], 1);

    let response = stats(&harness, "7", HeaderMap::new()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_require_configured_bearer_token() {
    let harness = harness_with(HarnessOptions {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..HarnessOptions::default()
    });

    let response = stats(&harness, "1", HeaderMap::new()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

    let response = stats(&harness, "1", bearer("admin-token-wrong-value")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = stats(&harness, "1", bearer(ADMIN_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// SECTION: Status Mapping
// ============================================================================

#[test]
fn status_mapping_covers_every_outcome() {
    let cases = [
        (AdmissionError::MissingToken, StatusCode::BAD_REQUEST),
        (AdmissionError::SurveyNotActive, StatusCode::BAD_REQUEST),
        (AdmissionError::SurveyNotOpenYet, StatusCode::BAD_REQUEST),
        (AdmissionError::SurveyClosed, StatusCode::BAD_REQUEST),
        (AdmissionError::SurveyNotFound(survey(3)), StatusCode::NOT_FOUND),
        (
            AdmissionError::RateLimitExceeded {
                retry_after: Duration::from_secs(5),
            },
            StatusCode::TOO_MANY_REQUESTS,
        ),
        (AdmissionError::InvalidOrExpiredToken, StatusCode::UNAUTHORIZED),
        (AdmissionError::SurveyNoLongerActive, StatusCode::FORBIDDEN),
        (AdmissionError::SubmissionWindowClosed, StatusCode::FORBIDDEN),
        (AdmissionError::AlreadyCompletedOrNotFound, StatusCode::CONFLICT),
        (
            AdmissionError::Store(StoreError::Io("disk full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (err, expected) in cases {
        assert_eq!(status_for(&err), expected, "{err:?}");
    }
}

#[tokio::test]
async fn persistence_errors_hide_backend_detail() {
    let api = super::ApiError::from(AdmissionError::Store(StoreError::Io(
        "/var/lib/secret.db locked".to_string(),
    )));
    let response = api.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "store_error");
    assert_eq!(body["error"]["message"], "internal error");
    assert!(!body.to_string().contains("secret.db"));

    let harness = harness();
    let api = super::ApiError::from(AdmissionError::Store(StoreError::Io(
        "/var/lib/secret.db locked".to_string(),
    )));
    let response = super::finish(
        &harness.state,
        AdmissionAction::CompleteSubmission,
        Some(survey(1)),
        Err(api),
    );
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body_json(response).await.to_string().contains("secret.db"));

    let events = harness.audit.events();
    match events.as_slice() {
        [AuditEvent::AdmissionRequest(event)] => {
            assert_eq!(event.error_kind, Some("store_error"));
            assert_eq!(event.http_status, 500);
            assert!(event.detail.as_deref().unwrap().contains("secret.db locked"));
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn caller_errors_carry_no_internal_detail() {
    let api = super::ApiError::from(AdmissionError::InvalidOrExpiredToken);
    assert!(api.internal_detail.is_none());
    let api = super::ApiError::from(AdmissionError::RateLimitExceeded {
        retry_after: Duration::from_secs(5),
    });
    assert!(api.internal_detail.is_none());
}

// ============================================================================
// SECTION: Audit and Reaper
// ============================================================================

#[tokio::test]
async fn audit_records_outcomes_without_identifying_data() {
    let harness = harness();
    let token = issued_token(&harness).await;
    assert_eq!(issue(&harness, "abc", HeaderMap::new(), "").await.status(), StatusCode::BAD_REQUEST);

    let events = harness.audit.events();
    assert_eq!(events.len(), 2);
    match &events[0] {
        AuditEvent::AdmissionRequest(event) => {
            assert_eq!(event.action, AdmissionAction::IssueToken);
            assert_eq!(event.survey_id, Some(1));
            assert_eq!(event.outcome, "ok");
            assert_eq!(event.http_status, 200);
        }
        other => panic!("unexpected event {other:?}"),
    }
    match &events[1] {
        AuditEvent::AdmissionRequest(event) => {
            assert_eq!(event.survey_id, None);
            assert_eq!(event.error_kind, Some("invalid_survey_id"));
            assert_eq!(event.http_status, 400);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let serialized = serde_json::to_string(&events).unwrap();
    assert!(serialized.contains("\"event\":\"admission_request\""));
    assert!(!serialized.contains(&token));
    assert!(!serialized.contains("192.0.2.10"));
}

#[tokio::test]
async fn purge_once_removes_expired_and_audits() {
    let harness = harness();
    issued_token(&harness).await;
    harness.clock.advance(Duration::from_secs(3_601));

    assert_eq!(purge_once(&harness.state).await, Some(1));
    assert_eq!(purge_once(&harness.state).await, Some(0));

    let purges: Vec<_> = harness
        .audit
        .events()
        .into_iter()
        .filter_map(|event| match event {
            AuditEvent::ExpirationPurge(purge) => Some(purge),
            AuditEvent::AdmissionRequest(_) => None,
        })
        .collect();
    assert_eq!(purges.len(), 2);
    assert_eq!(purges[0].removed, Some(1));
    assert!(purges[0].error.is_none());
}
