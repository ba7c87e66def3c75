// crates/survey-gate-config/src/config.rs
// ============================================================================
// Module: Survey Gate Configuration
// Description: Configuration loading and validation for survey-gate.toml.
// Purpose: Provide strict, fail-closed config parsing with safe defaults.
// Dependencies: survey-gate-core, survey-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! This module loads `survey-gate.toml`, applies defaults, and validates every
//! section before any component is constructed. Invalid values are rejected
//! rather than clamped. The hash salt is resolved and checked at startup so a
//! missing or weak salt never surfaces as a per-request failure.
//!
//! Security posture: config inputs are untrusted; secrets (hash salt, admin
//! token) are redacted from `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use survey_gate_core::AdmissionConfig;
use survey_gate_core::DEFAULT_RATE_LIMIT_CEILING;
use survey_gate_core::DEFAULT_RATE_LIMIT_WINDOW;
use survey_gate_core::DEFAULT_TOKEN_TTL;
use survey_gate_core::RateLimitEnforcement;
use survey_gate_core::RateLimitPolicy;
use survey_gate_core::SaltedHasher;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRecord;
use survey_gate_core::SurveyStatus;
use survey_gate_core::Timestamp;
use survey_gate_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use survey_gate_store_sqlite::SqliteStoreConfig;
use survey_gate_store_sqlite::SqliteStoreMode;
use survey_gate_store_sqlite::SqliteSyncMode;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config filename.
const DEFAULT_CONFIG_NAME: &str = "survey-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SURVEY_GATE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024;
/// Maximum configurable request body size in bytes.
const MAX_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Minimum admin bearer token length.
const MIN_ADMIN_TOKEN_LENGTH: usize = 16;
/// Maximum admin bearer token length.
const MAX_ADMIN_TOKEN_LENGTH: usize = 256;
/// Minimum token lifetime in seconds.
const MIN_TOKEN_TTL_SECS: u64 = 60;
/// Maximum token lifetime and rate-limit window in seconds.
const MAX_DURATION_SECS: u64 = 7 * 24 * 3_600;
/// Maximum issuance ceiling per window.
const MAX_RATE_LIMIT_CEILING: u32 = 10_000;
/// Default reaper interval in seconds.
const DEFAULT_REAPER_INTERVAL_SECS: u64 = 300;
/// Maximum reaper interval in seconds.
const MAX_REAPER_INTERVAL_SECS: u64 = 24 * 3_600;
/// Maximum number of seeded surveys.
const MAX_SURVEY_SEEDS: usize = 10_000;

// ============================================================================
// SECTION: Root
// ============================================================================

/// Survey Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyGateConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Admission control configuration.
    #[serde(default)]
    pub admission: AdmissionSettings,
    /// Submission store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Expiration reaper configuration.
    #[serde(default)]
    pub reaper: ReaperConfig,
    /// Surveys loaded into the survey lookup at startup.
    #[serde(default)]
    pub surveys: Vec<SurveySeedConfig>,
}

impl SurveyGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.admission.validate()?;
        self.store.validate()?;
        self.reaper.validate()?;
        validate_survey_seeds(&self.surveys)?;
        Ok(())
    }

    /// Returns the seeded surveys as domain records.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a seed entry is invalid.
    pub fn survey_records(&self) -> Result<Vec<SurveyRecord>, ConfigError> {
        self.surveys.iter().map(SurveySeedConfig::to_record).collect()
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Derive the client address from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Enable only behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
    /// Operator endpoint configuration.
    #[serde(default)]
    pub admin: AdminConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            trust_forwarded_headers: false,
            audit: ServerAuditConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_MAX_BODY_BYTES}"
            )));
        }
        self.audit.validate()?;
        self.admin.validate()
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

/// Operator endpoint configuration.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Bearer token required by the stats endpoint; open when absent.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AdminConfig {
    /// Validates admin configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(token) = &self.bearer_token {
            let len = token.len();
            if !(MIN_ADMIN_TOKEN_LENGTH ..= MAX_ADMIN_TOKEN_LENGTH).contains(&len) {
                return Err(ConfigError::Invalid(format!(
                    "server.admin.bearer_token must be {MIN_ADMIN_TOKEN_LENGTH}-{MAX_ADMIN_TOKEN_LENGTH} bytes"
                )));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(
                    "server.admin.bearer_token must not contain whitespace".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Admission
// ============================================================================

/// Admission control configuration.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionSettings {
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Maximum tokens per survey and client address per window.
    #[serde(default = "default_rate_limit_ceiling")]
    pub rate_limit_ceiling: u32,
    /// Sliding rate-limit window in seconds.
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    /// Rate-limit enforcement under concurrency.
    #[serde(default)]
    pub rate_limit_enforcement: RateLimitEnforcement,
    /// Inline hash salt.
    #[serde(default)]
    pub hash_salt: Option<String>,
    /// Environment variable holding the hash salt.
    #[serde(default)]
    pub hash_salt_env: Option<String>,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl_secs(),
            rate_limit_ceiling: default_rate_limit_ceiling(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            rate_limit_enforcement: RateLimitEnforcement::default(),
            hash_salt: None,
            hash_salt_env: None,
        }
    }
}

impl fmt::Debug for AdmissionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionSettings")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("rate_limit_ceiling", &self.rate_limit_ceiling)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_enforcement", &self.rate_limit_enforcement)
            .field("hash_salt", &self.hash_salt.as_ref().map(|_| "<redacted>"))
            .field("hash_salt_env", &self.hash_salt_env)
            .finish()
    }
}

impl AdmissionSettings {
    /// Returns the runtime admission configuration.
    #[must_use]
    pub const fn admission_config(&self) -> AdmissionConfig {
        AdmissionConfig {
            token_ttl: Duration::from_secs(self.token_ttl_secs),
            rate_limit: RateLimitPolicy {
                ceiling: self.rate_limit_ceiling,
                window: Duration::from_secs(self.rate_limit_window_secs),
                enforcement: self.rate_limit_enforcement,
            },
        }
    }

    /// Resolves the salt from the inline value or the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when no salt source is configured or the
    /// environment variable is unset.
    pub fn resolve_hash_salt(&self) -> Result<String, ConfigError> {
        match (&self.hash_salt, &self.hash_salt_env) {
            (Some(salt), None) => Ok(salt.clone()),
            (None, Some(var)) => env::var(var).map_err(|_| {
                ConfigError::Invalid(format!("admission.hash_salt_env {var} is not set"))
            }),
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "set only one of admission.hash_salt and admission.hash_salt_env".to_string(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "admission.hash_salt or admission.hash_salt_env is required".to_string(),
            )),
        }
    }

    /// Builds the salted hasher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the salt is missing or too weak.
    pub fn hasher(&self) -> Result<SaltedHasher, ConfigError> {
        let salt = self.resolve_hash_salt()?;
        SaltedHasher::new(&salt).map_err(|err| ConfigError::Invalid(format!("admission: {err}")))
    }

    /// Validates admission configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TOKEN_TTL_SECS ..= MAX_DURATION_SECS).contains(&self.token_ttl_secs) {
            return Err(ConfigError::Invalid(format!(
                "admission.token_ttl_secs must be between {MIN_TOKEN_TTL_SECS} and {MAX_DURATION_SECS}"
            )));
        }
        if !(1 ..= MAX_RATE_LIMIT_CEILING).contains(&self.rate_limit_ceiling) {
            return Err(ConfigError::Invalid(format!(
                "admission.rate_limit_ceiling must be between 1 and {MAX_RATE_LIMIT_CEILING}"
            )));
        }
        if !(1 ..= MAX_DURATION_SECS).contains(&self.rate_limit_window_secs) {
            return Err(ConfigError::Invalid(format!(
                "admission.rate_limit_window_secs must be between 1 and {MAX_DURATION_SECS}"
            )));
        }
        if self.rate_limit_window_secs > self.token_ttl_secs {
            return Err(ConfigError::Invalid(
                "admission.rate_limit_window_secs must not exceed admission.token_ttl_secs"
                    .to_string(),
            ));
        }
        match (&self.hash_salt, &self.hash_salt_env) {
            (Some(_), None) => {
                self.hasher()?;
            }
            (None, Some(var)) => {
                if var.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "admission.hash_salt_env must be non-empty".to_string(),
                    ));
                }
            }
            _ => {
                self.resolve_hash_salt()?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Submission store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local memory; lost on restart.
    #[default]
    Memory,
    /// Durable `SQLite` database.
    Sqlite,
}

/// Submission store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// `SQLite` busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Memory,
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` store configuration when the backend is `SQLite`.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match self.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => self.path.as_ref().map(|path| SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set store.path".to_string(),
                    ));
                }
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires store.path".to_string())
                })?;
                validate_path_string("store.path", &path.to_string_lossy())?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Reaper
// ============================================================================

/// Expiration reaper configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaperConfig {
    /// Run the reaper on a timer inside the server.
    #[serde(default = "default_reaper_enabled")]
    pub enabled: bool,
    /// Seconds between purges.
    #[serde(default = "default_reaper_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: default_reaper_enabled(),
            interval_secs: default_reaper_interval_secs(),
        }
    }
}

impl ReaperConfig {
    /// Returns the purge interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validates reaper configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_REAPER_INTERVAL_SECS).contains(&self.interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "reaper.interval_secs must be between 1 and {MAX_REAPER_INTERVAL_SECS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Survey Seeds
// ============================================================================

/// Survey entry loaded at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveySeedConfig {
    /// Survey identifier.
    pub id: u64,
    /// Survey status.
    #[serde(default = "default_seed_status")]
    pub status: SurveyStatus,
    /// RFC 3339 opening instant.
    #[serde(default)]
    pub opens_at: Option<String>,
    /// RFC 3339 closing instant.
    #[serde(default)]
    pub closes_at: Option<String>,
}

impl SurveySeedConfig {
    /// Converts the seed into a survey record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the id is zero, a timestamp is malformed,
    /// or the window is empty.
    pub fn to_record(&self) -> Result<SurveyRecord, ConfigError> {
        let survey_id = SurveyId::from_raw(self.id)
            .ok_or_else(|| ConfigError::Invalid("surveys.id must be positive".to_string()))?;
        let opens_at = parse_instant(survey_id, "opens_at", self.opens_at.as_deref())?;
        let closes_at = parse_instant(survey_id, "closes_at", self.closes_at.as_deref())?;
        if let (Some(opens), Some(closes)) = (opens_at, closes_at)
            && opens >= closes
        {
            return Err(ConfigError::Invalid(format!(
                "survey {survey_id}: opens_at must precede closes_at"
            )));
        }
        Ok(SurveyRecord {
            survey_id,
            status: self.status,
            opens_at,
            closes_at,
        })
    }
}

/// Validates the seed list.
fn validate_survey_seeds(seeds: &[SurveySeedConfig]) -> Result<(), ConfigError> {
    if seeds.len() > MAX_SURVEY_SEEDS {
        return Err(ConfigError::Invalid(format!(
            "at most {MAX_SURVEY_SEEDS} surveys may be seeded"
        )));
    }
    let mut seen = BTreeSet::new();
    for seed in seeds {
        let record = seed.to_record()?;
        if !seen.insert(record.survey_id) {
            return Err(ConfigError::Invalid(format!(
                "survey {} is listed more than once",
                record.survey_id
            )));
        }
    }
    Ok(())
}

/// Parses an optional RFC 3339 field.
fn parse_instant(
    survey_id: SurveyId,
    field: &str,
    value: Option<&str>,
) -> Result<Option<Timestamp>, ConfigError> {
    value
        .map(|text| {
            Timestamp::parse_rfc3339(text).map_err(|err| {
                ConfigError::Invalid(format!("survey {survey_id}: {field}: {err}"))
            })
        })
        .transpose()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    validate_path(Path::new(trimmed))
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

/// Default token lifetime.
const fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL.as_secs()
}

/// Default issuance ceiling.
const fn default_rate_limit_ceiling() -> u32 {
    DEFAULT_RATE_LIMIT_CEILING
}

/// Default rate-limit window.
const fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW.as_secs()
}

/// Default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// The reaper runs unless disabled.
const fn default_reaper_enabled() -> bool {
    true
}

/// Default reaper interval.
const fn default_reaper_interval_secs() -> u64 {
    DEFAULT_REAPER_INTERVAL_SECS
}

/// Seeded surveys default to active.
const fn default_seed_status() -> SurveyStatus {
    SurveyStatus::Active
}
