// crates/survey-gate-core/src/core/survey.rs
// ============================================================================
// Module: Survey Gate Survey Records
// Description: The survey facts admission control depends on.
// Purpose: Model survey status and the optional acceptance window.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Admission control only needs a narrow view of a survey: its lifecycle
//! status and the optional instants between which responses are accepted.
//! Survey authoring lives elsewhere; this crate reads these facts through the
//! [`crate::interfaces::SurveyLookup`] seam.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::SurveyId;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Survey Status
// ============================================================================

/// Survey lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    /// Being authored.
    Draft,
    /// Accepting responses.
    Active,
    /// Temporarily not accepting responses.
    Paused,
    /// Finished.
    Closed,
    /// Retained for history only.
    Archived,
}

impl SurveyStatus {
    /// Returns the canonical storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }

    /// Parses a storage label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "closed" => Some(Self::Closed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Survey Record
// ============================================================================

/// Where `now` falls relative to a survey's acceptance window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyWindow {
    /// Before `opens_at`.
    NotOpenYet,
    /// Inside the window (or no window configured).
    Open,
    /// After `closes_at`.
    Closed,
}

/// Survey facts consulted during issuance and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    /// Survey identifier.
    pub survey_id: SurveyId,
    /// Lifecycle status.
    pub status: SurveyStatus,
    /// First instant responses are accepted.
    pub opens_at: Option<Timestamp>,
    /// Last instant responses are accepted.
    pub closes_at: Option<Timestamp>,
}

impl SurveyRecord {
    /// Builds an active survey with no acceptance window.
    #[must_use]
    pub const fn active(survey_id: SurveyId) -> Self {
        Self {
            survey_id,
            status: SurveyStatus::Active,
            opens_at: None,
            closes_at: None,
        }
    }

    /// Returns true when the survey status admits responses.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SurveyStatus::Active
    }

    /// Classifies `now` against the acceptance window.
    #[must_use]
    pub fn window_at(&self, now: Timestamp) -> SurveyWindow {
        if let Some(opens_at) = self.opens_at
            && now < opens_at
        {
            return SurveyWindow::NotOpenYet;
        }
        if let Some(closes_at) = self.closes_at
            && now > closes_at
        {
            return SurveyWindow::Closed;
        }
        SurveyWindow::Open
    }
}
