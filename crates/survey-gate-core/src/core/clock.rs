// crates/survey-gate-core/src/core/clock.rs
// ============================================================================
// Module: Survey Gate Time Model
// Description: Canonical timestamps and injectable clocks.
// Purpose: Keep every "now" explicit so expiry and rate windows are testable.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Survey Gate stores instants as unix epoch milliseconds. Runtime components
//! never read wall-clock time directly; they ask an injected [`Clock`]. The
//! [`ManualClock`] lets tests step past token expiry or a rate-limit window
//! without sleeping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Instant expressed as unix epoch milliseconds.
///
/// # Invariants
/// - Arithmetic saturates instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns this instant shifted forward by `duration`.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration_millis(duration)))
    }

    /// Returns this instant shifted backward by `duration`.
    #[must_use]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        Self(self.0.saturating_sub(duration_millis(duration)))
    }

    /// Returns the non-negative duration from `self` until `later`.
    #[must_use]
    pub fn until(self, later: Self) -> Duration {
        let delta = later.0.saturating_sub(self.0);
        u64::try_from(delta).map_or(Duration::ZERO, Duration::from_millis)
    }

    /// Formats the timestamp as RFC 3339 in UTC.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the instant is outside the representable range.
    pub fn to_rfc3339(self) -> Result<String, TimeError> {
        let nanos = i128::from(self.0) * 1_000_000;
        let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|err| TimeError::OutOfRange(err.to_string()))?;
        datetime.format(&Rfc3339).map_err(|err| TimeError::Format(err.to_string()))
    }

    /// Parses an RFC 3339 timestamp, truncating to millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the input is not valid RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimeError> {
        let datetime = OffsetDateTime::parse(value.trim(), &Rfc3339)
            .map_err(|err| TimeError::Parse(err.to_string()))?;
        let millis = datetime.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis)
            .map(Self)
            .map_err(|_| TimeError::OutOfRange(format!("timestamp out of range: {value}")))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

/// Converts a duration into whole milliseconds, saturating at `i64::MAX`.
fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Timestamp conversion errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// Input could not be parsed.
    #[error("invalid timestamp: {0}")]
    Parse(String),
    /// Instant outside the supported calendar range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
    /// Formatting failed.
    #[error("timestamp format failed: {0}")]
    Format(String),
}

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Timestamp(i64::try_from(now.as_millis()).unwrap_or(i64::MAX))
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Current instant in unix epoch milliseconds.
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.as_unix_millis())),
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let delta = duration_millis(duration);
        let _ = self.millis.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
            Some(current.saturating_add(delta))
        });
    }

    /// Sets the clock to `instant`.
    pub fn set(&self, instant: Timestamp) {
        self.millis.store(instant.as_unix_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.millis.load(Ordering::SeqCst))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
