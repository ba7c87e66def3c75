// crates/survey-gate-core/src/runtime/completion.rs
// ============================================================================
// Module: Survey Gate Completion Tracker
// Description: One-way pending to completed transition.
// Purpose: Guarantee each attempt completes at most once.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Completion is a single conditional store update keyed on id and pending
//! status. Among concurrent callers for the same attempt exactly one sees the
//! update applied; every other caller gets
//! [`AdmissionError::AlreadyCompletedOrNotFound`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::AttemptId;
use crate::core::Clock;
use crate::core::Timestamp;
use crate::interfaces::SubmissionStore;
use crate::runtime::error::AdmissionError;

// ============================================================================
// SECTION: Completion Tracker
// ============================================================================

/// Marks submission attempts completed.
pub struct CompletionTracker<S> {
    /// Submission store.
    store: S,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl<S: SubmissionStore> CompletionTracker<S> {
    /// Creates a tracker.
    #[must_use]
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
        }
    }

    /// Completes the attempt and returns the completion instant.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::AlreadyCompletedOrNotFound`] when no pending
    /// attempt has `id`, or a store error.
    pub fn complete(&self, id: AttemptId) -> Result<Timestamp, AdmissionError> {
        let now = self.clock.now();
        if self.store.mark_completed(id, now)? {
            Ok(now)
        } else {
            Err(AdmissionError::AlreadyCompletedOrNotFound)
        }
    }
}
