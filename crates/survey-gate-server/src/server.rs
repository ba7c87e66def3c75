// crates/survey-gate-server/src/server.rs
// ============================================================================
// Module: Survey Gate HTTP Server
// Description: HTTP surface for token issuance, validation, and completion.
// Purpose: Map admission outcomes onto HTTP and run the expiration reaper.
// Dependencies: axum, tokio, survey-gate-config, survey-gate-core
// ============================================================================

//! ## Overview
//! [`SurveyGateServer`] builds a [`SubmissionGate`] from validated config and
//! exposes it over HTTP. Admission calls run on the blocking pool because
//! both store backends use synchronous locks. A periodic task runs the
//! expiration reaper when enabled.
//!
//! Routes:
//! - `POST /surveys/{survey_id}/token`
//! - `GET /surveys/{survey_id}/submissions/stats`
//! - `POST /submissions/validate`
//! - `POST /submissions/complete`
//! - `GET /health`
//!
//! Security posture: request bodies, headers and path segments are untrusted.
//! Persistence failures are reported as opaque 500s and never echo backend
//! detail to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path as UrlPath;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::RETRY_AFTER;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use survey_gate_config::ServerAuditConfig;
use survey_gate_config::StoreType;
use survey_gate_config::SurveyGateConfig;
use survey_gate_core::AdmissionError;
use survey_gate_core::Clock;
use survey_gate_core::ErrorClass;
use survey_gate_core::InMemorySubmissionStore;
use survey_gate_core::InMemorySurveyDirectory;
use survey_gate_core::SharedSubmissionStore;
use survey_gate_core::SharedSurveyLookup;
use survey_gate_core::SubmissionGate;
use survey_gate_core::SurveyId;
use survey_gate_core::SystemClock;
use survey_gate_core::Timestamp;
use survey_gate_store_sqlite::SqliteSubmissionStore;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::audit::AdmissionAction;
use crate::audit::AdmissionAuditEvent;
use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::PurgeAuditEvent;
use crate::audit::StderrAuditSink;
use crate::client_ip::client_address;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate type served over HTTP.
pub type Gate = SubmissionGate<SharedSubmissionStore, SharedSurveyLookup>;

/// Survey Gate HTTP server.
pub struct SurveyGateServer {
    /// Listen address.
    bind: SocketAddr,
    /// Request body ceiling.
    max_body_bytes: usize,
    /// Reaper interval when enabled.
    reaper_interval: Option<Duration>,
    /// Shared handler state.
    state: ServerState,
}

/// Shared state for request handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Admission gate.
    gate: Arc<Gate>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Time source for audit records.
    clock: Arc<dyn Clock>,
    /// Optional bearer token for the stats endpoint.
    admin_token: Option<String>,
    /// Use proxy headers for the client address.
    trust_forwarded_headers: bool,
}

impl ServerState {
    /// Creates handler state from its parts.
    #[must_use]
    pub fn new(
        gate: Arc<Gate>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        admin_token: Option<String>,
        trust_forwarded_headers: bool,
    ) -> Self {
        Self {
            gate,
            audit,
            clock,
            admin_token,
            trust_forwarded_headers,
        }
    }

    /// Returns the admission gate.
    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }
}

/// Server construction and transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be turned into components.
    #[error("server config error: {0}")]
    Config(String),
    /// Backend initialization failed.
    #[error("server init error: {0}")]
    Init(String),
    /// Listener or transport failure.
    #[error("server transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl SurveyGateServer {
    /// Builds the server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the salt, store, or audit sink cannot be
    /// initialized.
    pub fn from_config(config: &SurveyGateConfig) -> Result<Self, ServerError> {
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let gate = build_gate(config, Arc::clone(&clock))?;
        let audit = build_audit_sink(&config.server.audit)?;
        let state = ServerState::new(
            Arc::new(gate),
            audit,
            clock,
            config.server.admin.bearer_token.clone(),
            config.server.trust_forwarded_headers,
        );
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            reaper_interval: config.reaper.enabled.then(|| config.reaper.interval()),
            state,
        })
    }

    /// Returns the configured listen address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Serves requests until ctrl-c.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(err.to_string()))?;
        let reaper = self.reaper_interval.map(|interval| spawn_reaper(self.state.clone(), interval));
        let app = router(self.state, self.max_body_bytes);
        let result = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Transport(err.to_string()));
        if let Some(handle) = reaper {
            handle.abort();
        }
        result
    }
}

/// Builds the admission gate and loads seeded surveys into its lookup.
///
/// # Errors
///
/// Returns [`ServerError`] when the salt is unusable, a seed is invalid, or
/// the store cannot be opened.
pub fn build_gate(config: &SurveyGateConfig, clock: Arc<dyn Clock>) -> Result<Gate, ServerError> {
    let hasher = config.admission.hasher().map_err(|err| ServerError::Config(err.to_string()))?;
    let seeds = config.survey_records().map_err(|err| ServerError::Config(err.to_string()))?;
    let (store, lookup) = match config.store.store_type {
        StoreType::Memory => {
            let directory = InMemorySurveyDirectory::new();
            for survey in seeds {
                directory.upsert(survey).map_err(|err| ServerError::Init(err.to_string()))?;
            }
            (
                SharedSubmissionStore::from_store(InMemorySubmissionStore::new()),
                SharedSurveyLookup::from_lookup(directory),
            )
        }
        StoreType::Sqlite => {
            let sqlite_config = config
                .store
                .sqlite_config()
                .ok_or_else(|| ServerError::Config("sqlite store requires store.path".to_string()))?;
            let store = SqliteSubmissionStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            for survey in &seeds {
                store.upsert_survey(survey).map_err(|err| ServerError::Init(err.to_string()))?;
            }
            (
                SharedSubmissionStore::from_store(store.clone()),
                SharedSurveyLookup::from_lookup(store),
            )
        }
    };
    Ok(SubmissionGate::new(store, lookup, hasher, config.admission.admission_config(), clock))
}

/// Builds the audit sink selected by `[server.audit]`.
///
/// # Errors
///
/// Returns [`ServerError::Init`] when the audit file cannot be opened.
pub fn build_audit_sink(config: &ServerAuditConfig) -> Result<Arc<dyn AuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| ServerError::Init(format!("audit log {path}: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Builds the HTTP router.
#[must_use]
pub fn router(state: ServerState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/surveys/{survey_id}/token", post(handle_issue_token))
        .route("/surveys/{survey_id}/submissions/stats", get(handle_stats))
        .route("/submissions/validate", post(handle_validate))
        .route("/submissions/complete", post(handle_complete))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Issuance request body; the whole body is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueTokenRequest {
    /// Optional browser fingerprint.
    #[serde(default)]
    fingerprint: Option<String>,
}

/// Issuance response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueTokenResponse {
    /// Access token.
    token: String,
    /// RFC 3339 expiry.
    expires_at: String,
    /// Seconds until expiry.
    expires_in_seconds: u64,
}

/// Body carrying an access token.
#[derive(Debug, Default, Deserialize)]
struct TokenRequest {
    /// Access token.
    #[serde(default)]
    token: String,
}

/// Validation response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponse {
    /// Attempt id.
    submission_id: u64,
    /// Survey id.
    survey_id: u64,
    /// RFC 3339 expiry.
    expires_at: String,
}

/// Completion response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteResponse {
    /// Attempt id.
    submission_id: u64,
    /// RFC 3339 completion instant.
    completed_at: String,
}

/// HTTP error with a stable code.
#[derive(Debug)]
struct ApiError {
    /// HTTP status.
    status: StatusCode,
    /// Stable error code.
    code: &'static str,
    /// Caller-facing message.
    message: String,
    /// Retry hint for 429 responses.
    retry_after: Option<Duration>,
    /// Backend failure text kept for the audit log only.
    internal_detail: Option<String>,
}

impl ApiError {
    /// Creates a 400 for malformed input.
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
            retry_after: None,
            internal_detail: None,
        }
    }

    /// Creates an opaque 500 carrying `detail` for the audit log.
    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal_error",
            message: "internal error".to_string(),
            retry_after: None,
            internal_detail: Some(detail.into()),
        }
    }

    /// Creates a 401 for the stats endpoint.
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized",
            message: "bearer token required".to_string(),
            retry_after: None,
            internal_detail: None,
        }
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        let status = status_for(&err);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal error".to_string()
        } else {
            err.to_string()
        };
        let internal_detail = (err.class() == ErrorClass::Persistence).then(|| err.to_string());
        Self {
            status,
            code: err.kind(),
            message,
            retry_after: err.retry_after(),
            internal_detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        let mut response = (self.status, body).into_response();
        if let Some(retry) = self.retry_after {
            let seconds = retry.as_secs() + u64::from(retry.subsec_nanos() > 0);
            response.headers_mut().insert(RETRY_AFTER, HeaderValue::from(seconds.max(1)));
        }
        if self.status == StatusCode::UNAUTHORIZED && self.code == "unauthorized" {
            response.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Maps an admission outcome to its HTTP status.
#[must_use]
pub const fn status_for(err: &AdmissionError) -> StatusCode {
    match err {
        AdmissionError::MissingToken
        | AdmissionError::SurveyNotActive
        | AdmissionError::SurveyNotOpenYet
        | AdmissionError::SurveyClosed => StatusCode::BAD_REQUEST,
        AdmissionError::SurveyNotFound(_) => StatusCode::NOT_FOUND,
        AdmissionError::RateLimitExceeded {
            ..
        } => StatusCode::TOO_MANY_REQUESTS,
        AdmissionError::InvalidOrExpiredToken => StatusCode::UNAUTHORIZED,
        AdmissionError::SurveyNoLongerActive | AdmissionError::SubmissionWindowClosed => {
            StatusCode::FORBIDDEN
        }
        AdmissionError::AlreadyCompletedOrNotFound => StatusCode::CONFLICT,
        AdmissionError::TokenGeneration(_)
        | AdmissionError::Store(_)
        | AdmissionError::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `GET /health`.
pub(crate) async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Handles `POST /surveys/{survey_id}/token`.
pub(crate) async fn handle_issue_token(
    State(state): State<ServerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    UrlPath(raw_survey_id): UrlPath<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let survey_id = raw_survey_id.parse::<SurveyId>().ok();
    let result = issue_token(&state, survey_id, peer, &headers, &body).await;
    finish(&state, AdmissionAction::IssueToken, survey_id, result)
}

/// Handles `GET /surveys/{survey_id}/submissions/stats`.
pub(crate) async fn handle_stats(
    State(state): State<ServerState>,
    UrlPath(raw_survey_id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let survey_id = raw_survey_id.parse::<SurveyId>().ok();
    let result = read_stats(&state, survey_id, &headers).await;
    finish(&state, AdmissionAction::ReadStats, survey_id, result)
}

/// Handles `POST /submissions/validate`.
pub(crate) async fn handle_validate(State(state): State<ServerState>, body: Bytes) -> Response {
    let result = validate_token(&state, &body).await;
    let survey_id = result.as_ref().ok().map(|(survey_id, _)| *survey_id);
    finish(&state, AdmissionAction::ValidateToken, survey_id, result.map(|(_, response)| response))
}

/// Handles `POST /submissions/complete`.
pub(crate) async fn handle_complete(State(state): State<ServerState>, body: Bytes) -> Response {
    let result = complete_submission(&state, &body).await;
    let survey_id = result.as_ref().ok().map(|(survey_id, _)| *survey_id);
    finish(
        &state,
        AdmissionAction::CompleteSubmission,
        survey_id,
        result.map(|(_, response)| response),
    )
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Issues a token for the resolved client.
async fn issue_token(
    state: &ServerState,
    survey_id: Option<SurveyId>,
    peer: SocketAddr,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ApiError> {
    let survey_id =
        survey_id.ok_or_else(|| ApiError::bad_request("invalid_survey_id", "invalid survey id"))?;
    let request: IssueTokenRequest = parse_lenient_body(body);
    let fingerprint = request.fingerprint.unwrap_or_default();
    let client_ip = client_address(headers, peer, state.trust_forwarded_headers);
    let issued =
        run_blocking(state, move |gate| gate.issue_token(survey_id, &client_ip, &fingerprint))
            .await?;
    let response = IssueTokenResponse {
        token: issued.token.into_inner(),
        expires_at: rfc3339(issued.expires_at)?,
        expires_in_seconds: issued.expires_in.as_secs(),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Reads statistics after the admin check.
async fn read_stats(
    state: &ServerState,
    survey_id: Option<SurveyId>,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    authorize_admin(state, headers)?;
    let survey_id =
        survey_id.ok_or_else(|| ApiError::bad_request("invalid_survey_id", "invalid survey id"))?;
    let stats = run_blocking(state, move |gate| gate.stats(survey_id)).await?;
    Ok((StatusCode::OK, Json(stats)).into_response())
}

/// Validates a token without consuming it.
async fn validate_token(
    state: &ServerState,
    body: &[u8],
) -> Result<(SurveyId, Response), ApiError> {
    let request: TokenRequest = parse_optional_body(body)?;
    let attempt = run_blocking(state, move |gate| gate.validate(&request.token)).await?;
    let response = ValidateResponse {
        submission_id: attempt.id.get(),
        survey_id: attempt.survey_id.get(),
        expires_at: rfc3339(attempt.expires_at)?,
    };
    Ok((attempt.survey_id, (StatusCode::OK, Json(response)).into_response()))
}

/// Validates and completes a token.
async fn complete_submission(
    state: &ServerState,
    body: &[u8],
) -> Result<(SurveyId, Response), ApiError> {
    let request: TokenRequest = parse_optional_body(body)?;
    let redeemed = run_blocking(state, move |gate| gate.redeem(&request.token)).await?;
    let response = CompleteResponse {
        submission_id: redeemed.attempt_id.get(),
        completed_at: rfc3339(redeemed.completed_at)?,
    };
    Ok((redeemed.survey_id, (StatusCode::OK, Json(response)).into_response()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a gate call on the blocking pool.
async fn run_blocking<T, F>(state: &ServerState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Gate) -> Result<T, AdmissionError> + Send + 'static,
{
    let gate = Arc::clone(&state.gate);
    match tokio::task::spawn_blocking(move || op(&gate)).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => Err(ApiError::internal(format!("blocking task failed: {err}"))),
    }
}

/// Parses a JSON body; an empty body yields the default value.
fn parse_optional_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|_| ApiError::bad_request("invalid_body", "request body must be valid JSON"))
}

/// Parses an optional JSON body; empty or undecodable input yields the default.
fn parse_lenient_body<T>(body: &[u8]) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    serde_json::from_slice(body).unwrap_or_default()
}

/// Formats a timestamp for a response body.
fn rfc3339(timestamp: Timestamp) -> Result<String, ApiError> {
    timestamp.to_rfc3339().map_err(|err| ApiError::internal(err.to_string()))
}

/// Checks the stats bearer token when one is configured.
fn authorize_admin(state: &ServerState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = &state.admin_token else {
        return Ok(());
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(ApiError::unauthorized)?;
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(ApiError::unauthorized())
    }
}

/// Records the audit event and renders the response.
fn finish(
    state: &ServerState,
    action: AdmissionAction,
    survey_id: Option<SurveyId>,
    result: Result<Response, ApiError>,
) -> Response {
    let (response, error_kind, detail) = match result {
        Ok(response) => (response, None, None),
        Err(mut err) => {
            let code = err.code;
            let detail = err.internal_detail.take();
            (err.into_response(), Some(code), detail)
        }
    };
    state.audit.record(&AuditEvent::AdmissionRequest(AdmissionAuditEvent {
        timestamp_ms: state.clock.now().as_unix_millis(),
        action,
        survey_id: survey_id.map(SurveyId::get),
        outcome: if error_kind.is_some() { "error" } else { "ok" },
        error_kind,
        http_status: response.status().as_u16(),
        detail,
    }));
    response
}

// ============================================================================
// SECTION: Reaper
// ============================================================================

/// Runs one purge and records the outcome.
pub async fn purge_once(state: &ServerState) -> Option<u64> {
    let gate = Arc::clone(&state.gate);
    let outcome = tokio::task::spawn_blocking(move || gate.purge_expired()).await;
    let (removed, error) = match outcome {
        Ok(Ok(removed)) => (Some(removed), None),
        Ok(Err(err)) => (None, Some(err.to_string())),
        Err(err) => (None, Some(err.to_string())),
    };
    state.audit.record(&AuditEvent::ExpirationPurge(PurgeAuditEvent {
        timestamp_ms: state.clock.now().as_unix_millis(),
        removed,
        error,
    }));
    removed
}

/// Spawns the periodic reaper task.
fn spawn_reaper(state: ServerState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            purge_once(&state).await;
        }
    })
}

/// Resolves when ctrl-c is received; never resolves if the handler fails.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
