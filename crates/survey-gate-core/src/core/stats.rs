// crates/survey-gate-core/src/core/stats.rs
// ============================================================================
// Module: Survey Gate Submission Statistics
// Description: Per-survey attempt counts and derived rates.
// Purpose: Give operators a read-only view of admission outcomes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Stores report raw [`AttemptCounts`]; [`SubmissionStats`] adds the derived
//! completion rate and participant count. Expired attempts are classified at
//! read time and disappear from every bucket once purged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Counts
// ============================================================================

/// Raw attempt counts for one survey at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounts {
    /// Every stored attempt.
    pub total: u64,
    /// Attempts with status `completed`.
    pub completed: u64,
    /// Pending attempts that are still usable.
    pub pending: u64,
    /// Pending attempts past expiry that have not been purged.
    pub expired: u64,
}

/// Aggregated submission statistics for one survey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    /// Every stored attempt.
    pub total: u64,
    /// Completed attempts.
    pub completed: u64,
    /// Usable pending attempts.
    pub pending: u64,
    /// Expired, unpurged attempts.
    pub expired: u64,
    /// `completed / total * 100`, or 0 when there are no attempts.
    pub completion_rate: f64,
    /// One participant per completed attempt.
    pub unique_participants: u64,
}

impl From<AttemptCounts> for SubmissionStats {
    #[allow(clippy::cast_precision_loss, reason = "Rates are reported as approximate percentages.")]
    fn from(counts: AttemptCounts) -> Self {
        let completion_rate = if counts.total == 0 {
            0.0
        } else {
            counts.completed as f64 / counts.total as f64 * 100.0
        };
        Self {
            total: counts.total,
            completed: counts.completed,
            pending: counts.pending,
            expired: counts.expired,
            completion_rate,
            unique_participants: counts.completed,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
