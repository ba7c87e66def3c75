// crates/survey-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Submission Store
// Description: Durable SubmissionStore and SurveyLookup backed by SQLite.
// Purpose: Persist submission attempts with single-statement state changes.
// Dependencies: survey-gate-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`SubmissionStore`] and [`SurveyLookup`] over one
//! `SQLite` database. Validation, completion, and purging are each a single
//! SQL statement whose `WHERE` clause carries the full predicate, so the
//! database decides every race. The strict rate-limit insert runs its count
//! and insert inside a `BEGIN IMMEDIATE` transaction, which takes the write
//! lock before counting.
//!
//! Security posture: only salted hashes are written; raw client addresses
//! never reach this module. Database contents are treated as untrusted and
//! rows that fail to decode are reported as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use survey_gate_core::AccessToken;
use survey_gate_core::AttemptCounts;
use survey_gate_core::AttemptId;
use survey_gate_core::AttemptStatus;
use survey_gate_core::LimitedInsert;
use survey_gate_core::NewAttempt;
use survey_gate_core::OpaqueHash;
use survey_gate_core::RecentIssuance;
use survey_gate_core::StoreError;
use survey_gate_core::SubmissionAttempt;
use survey_gate_core::SubmissionStore;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyLookup;
use survey_gate_core::SurveyLookupError;
use survey_gate_core::SurveyRecord;
use survey_gate_core::SurveyStatus;
use survey_gate_core::Timestamp;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Column list shared by attempt queries.
const ATTEMPT_COLUMNS: &str = "attempt_id, survey_id, access_token, ip_hash, fingerprint_hash, \
                               status, created_at, expires_at, completed_at";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` submission store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default tuning.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Uniqueness constraint violated.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Stored row failed to decode.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<SqliteStoreError> for SurveyLookupError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Corrupt(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
            other => Self::Io(other.to_string()),
        }
    }
}

/// Maps an engine error, preserving constraint violations as conflicts.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        SqliteStoreError::Conflict(err.to_string())
    } else {
        SqliteStoreError::Db(err.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed submission store and survey lookup.
#[derive(Clone)]
pub struct SqliteSubmissionStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSubmissionStore {
    /// Opens an `SQLite`-backed submission store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Inserts or replaces a survey row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_survey(&self, survey: &SurveyRecord) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO surveys (survey_id, status, opens_at, closes_at) VALUES (?1, ?2, ?3, \
                 ?4) ON CONFLICT(survey_id) DO UPDATE SET status = excluded.status, opens_at = \
                 excluded.opens_at, closes_at = excluded.closes_at",
                params![
                    survey_key(survey.survey_id)?,
                    survey.status.as_str(),
                    survey.opens_at.map(Timestamp::as_unix_millis),
                    survey.closes_at.map(Timestamp::as_unix_millis),
                ],
            )
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(())
    }

    /// Updates a survey's status. Returns false when the survey is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn set_survey_status(
        &self,
        survey_id: SurveyId,
        status: SurveyStatus,
    ) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE surveys SET status = ?2 WHERE survey_id = ?1",
                params![survey_key(survey_id)?, status.as_str()],
            )
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(changed == 1)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Inserts a pending attempt on `conn` and reads back the stored row.
    fn insert_on(
        conn: &Connection,
        attempt: &NewAttempt,
    ) -> Result<SubmissionAttempt, SqliteStoreError> {
        conn.execute(
            "INSERT INTO submission_attempts (survey_id, access_token, ip_hash, fingerprint_hash, \
             status, created_at, expires_at, completed_at) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, \
             ?6, NULL)",
            params![
                survey_key(attempt.survey_id)?,
                attempt.access_token.as_str(),
                attempt.ip_hash.as_str(),
                attempt.fingerprint_hash.as_ref().map(OpaqueHash::as_str),
                attempt.created_at.as_unix_millis(),
                attempt.expires_at.as_unix_millis(),
            ],
        )
        .map_err(|err| db_error(&err))?;
        let raw_id = u64::try_from(conn.last_insert_rowid())
            .map_err(|_| SqliteStoreError::Corrupt("negative attempt id".to_string()))?;
        let id = AttemptId::from_raw(raw_id)
            .ok_or_else(|| SqliteStoreError::Corrupt("zero attempt id".to_string()))?;
        Ok(SubmissionAttempt::pending(id, attempt.clone()))
    }

    /// Counts recent issuances on `conn`.
    fn recent_on(
        conn: &Connection,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        window_start: Timestamp,
    ) -> Result<RecentIssuance, SqliteStoreError> {
        let (count, oldest): (i64, Option<i64>) = conn
            .query_row(
                "SELECT COUNT(*), MIN(created_at) FROM submission_attempts WHERE survey_id = ?1 \
                 AND ip_hash = ?2 AND created_at >= ?3",
                params![survey_key(survey_id)?, ip_hash.as_str(), window_start.as_unix_millis()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|err| db_error(&err))?;
        Ok(RecentIssuance {
            count: to_count(count)?,
            oldest_created_at: oldest.map(Timestamp::from_unix_millis),
        })
    }
}

impl SubmissionStore for SqliteSubmissionStore {
    fn insert_attempt(&self, attempt: &NewAttempt) -> Result<SubmissionAttempt, StoreError> {
        let guard = self.lock()?;
        let stored = Self::insert_on(&guard, attempt)?;
        drop(guard);
        Ok(stored)
    }

    fn insert_attempt_within_limit(
        &self,
        attempt: &NewAttempt,
        window_start: Timestamp,
        ceiling: u32,
    ) -> Result<LimitedInsert, StoreError> {
        let mut guard = self.lock()?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| db_error(&err))?;
        let recent = Self::recent_on(&tx, attempt.survey_id, &attempt.ip_hash, window_start)?;
        let outcome = if recent.count >= u64::from(ceiling) {
            LimitedInsert::Limited(recent)
        } else {
            LimitedInsert::Inserted(Self::insert_on(&tx, attempt)?)
        };
        tx.commit().map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(outcome)
    }

    fn count_recent(
        &self,
        survey_id: SurveyId,
        ip_hash: &OpaqueHash,
        window_start: Timestamp,
    ) -> Result<RecentIssuance, StoreError> {
        let guard = self.lock()?;
        let recent = Self::recent_on(&guard, survey_id, ip_hash, window_start)?;
        drop(guard);
        Ok(recent)
    }

    fn find_usable(
        &self,
        token: &AccessToken,
        now: Timestamp,
    ) -> Result<Option<SubmissionAttempt>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {ATTEMPT_COLUMNS} FROM submission_attempts WHERE access_token = ?1 \
                     AND status = 'pending' AND expires_at > ?2"
                ),
                params![token.as_str(), now.as_unix_millis()],
                read_attempt_row,
            )
            .optional()
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(row.map(decode_attempt).transpose()?)
    }

    fn mark_completed(&self, id: AttemptId, now: Timestamp) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE submission_attempts SET status = 'completed', completed_at = ?2 WHERE \
                 attempt_id = ?1 AND status = 'pending'",
                params![attempt_key(id)?, now.as_unix_millis()],
            )
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(changed == 1)
    }

    fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let removed = guard
            .execute(
                "DELETE FROM submission_attempts WHERE status = 'pending' AND expires_at < ?1",
                params![now.as_unix_millis()],
            )
            .map_err(|err| db_error(&err))?;
        drop(guard);
        u64::try_from(removed).map_err(|_| StoreError::Invalid("purge count overflow".to_string()))
    }

    fn survey_counts(
        &self,
        survey_id: SurveyId,
        now: Timestamp,
    ) -> Result<AttemptCounts, StoreError> {
        let guard = self.lock()?;
        let (total, completed, pending, expired): (i64, i64, i64, i64) = guard
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 \
                 END), 0), COALESCE(SUM(CASE WHEN status = 'pending' AND expires_at > ?2 THEN 1 \
                 ELSE 0 END), 0), COALESCE(SUM(CASE WHEN status = 'pending' AND expires_at <= ?2 \
                 THEN 1 ELSE 0 END), 0) FROM submission_attempts WHERE survey_id = ?1",
                params![survey_key(survey_id)?, now.as_unix_millis()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(AttemptCounts {
            total: to_count(total)?,
            completed: to_count(completed)?,
            pending: to_count(pending)?,
            expired: to_count(expired)?,
        })
    }

    fn get(&self, id: AttemptId) -> Result<Option<SubmissionAttempt>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!("SELECT {ATTEMPT_COLUMNS} FROM submission_attempts WHERE attempt_id = ?1"),
                params![attempt_key(id)?],
                read_attempt_row,
            )
            .optional()
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(row.map(decode_attempt).transpose()?)
    }
}

impl SurveyLookup for SqliteSubmissionStore {
    fn survey(&self, survey_id: SurveyId) -> Result<Option<SurveyRecord>, SurveyLookupError> {
        let guard = self.lock()?;
        let row: Option<(String, Option<i64>, Option<i64>)> = guard
            .query_row(
                "SELECT status, opens_at, closes_at FROM surveys WHERE survey_id = ?1",
                params![survey_key(survey_id)?],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|err| db_error(&err))?;
        drop(guard);
        let Some((status, opens_at, closes_at)) = row else {
            return Ok(None);
        };
        let status = SurveyStatus::parse(&status).ok_or_else(|| {
            SurveyLookupError::Invalid(format!("unknown survey status: {status}"))
        })?;
        Ok(Some(SurveyRecord {
            survey_id,
            status,
            opens_at: opens_at.map(Timestamp::from_unix_millis),
            closes_at: closes_at.map(Timestamp::from_unix_millis),
        }))
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Raw attempt columns as read from `SQLite`.
struct AttemptRow {
    /// `attempt_id` column.
    attempt_id: i64,
    /// `survey_id` column.
    survey_id: i64,
    /// `access_token` column.
    access_token: String,
    /// `ip_hash` column.
    ip_hash: String,
    /// `fingerprint_hash` column.
    fingerprint_hash: Option<String>,
    /// `status` column.
    status: String,
    /// `created_at` column.
    created_at: i64,
    /// `expires_at` column.
    expires_at: i64,
    /// `completed_at` column.
    completed_at: Option<i64>,
}

/// Reads [`ATTEMPT_COLUMNS`] from a row.
fn read_attempt_row(row: &Row<'_>) -> rusqlite::Result<AttemptRow> {
    Ok(AttemptRow {
        attempt_id: row.get(0)?,
        survey_id: row.get(1)?,
        access_token: row.get(2)?,
        ip_hash: row.get(3)?,
        fingerprint_hash: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        expires_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

/// Converts a raw row into a domain attempt, rejecting inconsistent data.
fn decode_attempt(row: AttemptRow) -> Result<SubmissionAttempt, SqliteStoreError> {
    let id = u64::try_from(row.attempt_id)
        .ok()
        .and_then(AttemptId::from_raw)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid attempt id {}", row.attempt_id)))?;
    let survey_id = u64::try_from(row.survey_id)
        .ok()
        .and_then(SurveyId::from_raw)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid survey id {}", row.survey_id)))?;
    let status = AttemptStatus::parse(&row.status)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid attempt status {}", row.status)))?;
    if (status == AttemptStatus::Completed) != row.completed_at.is_some() {
        return Err(SqliteStoreError::Corrupt(format!(
            "completed_at inconsistent with status for attempt {id}"
        )));
    }
    Ok(SubmissionAttempt {
        id,
        survey_id,
        access_token: AccessToken::new(row.access_token),
        ip_hash: OpaqueHash::from_stored(row.ip_hash),
        fingerprint_hash: row.fingerprint_hash.map(OpaqueHash::from_stored),
        status,
        created_at: Timestamp::from_unix_millis(row.created_at),
        expires_at: Timestamp::from_unix_millis(row.expires_at),
        completed_at: row.completed_at.map(Timestamp::from_unix_millis),
    })
}

/// Converts a survey id into its `SQLite` key.
fn survey_key(survey_id: SurveyId) -> Result<i64, SqliteStoreError> {
    i64::try_from(survey_id.get())
        .map_err(|_| SqliteStoreError::Invalid(format!("survey id out of range: {survey_id}")))
}

/// Converts an attempt id into its `SQLite` key.
fn attempt_key(id: AttemptId) -> Result<i64, SqliteStoreError> {
    i64::try_from(id.get())
        .map_err(|_| SqliteStoreError::Invalid(format!("attempt id out of range: {id}")))
}

/// Converts an aggregate count into `u64`.
fn to_count(value: i64) -> Result<u64, SqliteStoreError> {
    u64::try_from(value).map_err(|_| SqliteStoreError::Corrupt(format!("negative count {value}")))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.trim().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must be non-empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS surveys (
                    survey_id INTEGER PRIMARY KEY,
                    status TEXT NOT NULL,
                    opens_at INTEGER,
                    closes_at INTEGER
                );
                CREATE TABLE IF NOT EXISTS submission_attempts (
                    attempt_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    survey_id INTEGER NOT NULL,
                    access_token TEXT NOT NULL,
                    ip_hash TEXT NOT NULL,
                    fingerprint_hash TEXT,
                    status TEXT NOT NULL CHECK (status IN ('pending', 'completed')),
                    created_at INTEGER NOT NULL,
                    expires_at INTEGER NOT NULL,
                    completed_at INTEGER,
                    CHECK ((status = 'completed') = (completed_at IS NOT NULL))
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_submission_attempts_token
                    ON submission_attempts (access_token);
                CREATE INDEX IF NOT EXISTS idx_submission_attempts_rate
                    ON submission_attempts (survey_id, ip_hash, created_at);
                CREATE INDEX IF NOT EXISTS idx_submission_attempts_expiry
                    ON submission_attempts (status, expires_at);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
