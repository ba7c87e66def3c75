// crates/survey-gate-core/src/runtime/reaper.rs
// ============================================================================
// Module: Survey Gate Expiration Reaper
// Description: Bulk removal of expired pending attempts.
// Purpose: Keep the attempt table bounded without touching completed records.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The reaper issues one conditional bulk delete. It only removes attempts
//! that validation already refuses, so it can run at any time alongside
//! issuance, validation, and completion. Scheduling belongs to the host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::Clock;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;

// ============================================================================
// SECTION: Expiration Reaper
// ============================================================================

/// Deletes pending attempts past their expiry.
pub struct ExpirationReaper<S> {
    /// Submission store.
    store: S,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl<S: SubmissionStore> ExpirationReaper<S> {
    /// Creates a reaper.
    #[must_use]
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
        }
    }

    /// Purges expired pending attempts and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    pub fn purge_expired(&self) -> Result<u64, StoreError> {
        self.store.purge_expired(self.clock.now())
    }
}
