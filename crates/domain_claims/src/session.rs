//! Claim session state machine
//!
//! A [`ClaimSession`] is the only mutable state in the application. It is an
//! explicit value owned by the caller; nothing about it is global.
//!
//! # Invariants
//!
//! - A claim is present in every stage except `New`
//! - An analysis run is present in `Analyzed` and `ReportReady`, with exactly
//!   one result per claim image
//! - A rejected transition leaves the session untouched

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use core_kernel::SessionId;

use crate::assessment::AnalysisRun;
use crate::claim::Claim;
use crate::error::ClaimError;

/// Externally visible stage of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStage {
    New,
    ImagesCollected,
    Analyzed,
    ReportReady,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStage::New => "NEW",
            SessionStage::ImagesCollected => "IMAGES_COLLECTED",
            SessionStage::Analyzed => "ANALYZED",
            SessionStage::ReportReady => "REPORT_READY",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
enum SessionState {
    New,
    ImagesCollected {
        claim: Claim,
    },
    Analyzed {
        claim: Claim,
        run: AnalysisRun,
    },
    ReportReady {
        claim: Claim,
        run: AnalysisRun,
        generated_at: DateTime<Utc>,
    },
}

/// In-memory state of the single active claim flow
#[derive(Debug, Clone)]
pub struct ClaimSession {
    id: SessionId,
    started_at: DateTime<Utc>,
    state: SessionState,
}

impl Default for ClaimSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSession {
    /// Starts an empty session
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            started_at: Utc::now(),
            state: SessionState::New,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stage(&self) -> SessionStage {
        match self.state {
            SessionState::New => SessionStage::New,
            SessionState::ImagesCollected { .. } => SessionStage::ImagesCollected,
            SessionState::Analyzed { .. } => SessionStage::Analyzed,
            SessionState::ReportReady { .. } => SessionStage::ReportReady,
        }
    }

    pub fn claim(&self) -> Option<&Claim> {
        match &self.state {
            SessionState::New => None,
            SessionState::ImagesCollected { claim }
            | SessionState::Analyzed { claim, .. }
            | SessionState::ReportReady { claim, .. } => Some(claim),
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisRun> {
        match &self.state {
            SessionState::Analyzed { run, .. } | SessionState::ReportReady { run, .. } => Some(run),
            _ => None,
        }
    }

    /// When the last report was exported, if the session is `ReportReady`
    pub fn report_generated_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            SessionState::ReportReady { generated_at, .. } => Some(*generated_at),
            _ => None,
        }
    }

    /// Stores a new claim, discarding any previous claim and results
    pub fn submit_claim(&mut self, claim: Claim) {
        info!(
            session_id = %self.id,
            claim_id = %claim.claim_id(),
            images = claim.image_count(),
            "Claim collected"
        );
        self.state = SessionState::ImagesCollected { claim };
    }

    /// Returns the claim to analyse, or an error if none has been collected
    pub fn claim_for_analysis(&self) -> Result<&Claim, ClaimError> {
        self.claim()
            .ok_or_else(|| self.rejected(SessionStage::Analyzed))
    }

    /// Stores an analysis run; a previous run is replaced
    pub fn record_analysis(&mut self, run: AnalysisRun) -> Result<(), ClaimError> {
        let expected = self
            .claim()
            .ok_or_else(|| self.rejected(SessionStage::Analyzed))?
            .image_count();
        if run.results.len() != expected {
            return Err(ClaimError::ResultCountMismatch {
                expected,
                actual: run.results.len(),
            });
        }

        let claim = match std::mem::replace(&mut self.state, SessionState::New) {
            SessionState::ImagesCollected { claim }
            | SessionState::Analyzed { claim, .. }
            | SessionState::ReportReady { claim, .. } => claim,
            SessionState::New => return Err(self.rejected(SessionStage::Analyzed)),
        };
        self.state = SessionState::Analyzed { claim, run };
        Ok(())
    }

    /// Returns the claim and run a report is built from
    pub fn report_inputs(&self) -> Result<(&Claim, &AnalysisRun), ClaimError> {
        match &self.state {
            SessionState::Analyzed { claim, run }
            | SessionState::ReportReady { claim, run, .. } => Ok((claim, run)),
            _ => Err(self.rejected(SessionStage::ReportReady)),
        }
    }

    /// Marks that a report has been exported for the current run
    pub fn mark_report_ready(&mut self, generated_at: DateTime<Utc>) -> Result<(), ClaimError> {
        if !matches!(
            self.state,
            SessionState::Analyzed { .. } | SessionState::ReportReady { .. }
        ) {
            return Err(self.rejected(SessionStage::ReportReady));
        }

        self.state = match std::mem::replace(&mut self.state, SessionState::New) {
            SessionState::Analyzed { claim, run }
            | SessionState::ReportReady { claim, run, .. } => SessionState::ReportReady {
                claim,
                run,
                generated_at,
            },
            other => other,
        };
        Ok(())
    }

    /// Drops everything and starts a fresh session scope
    pub fn reset(&mut self) {
        info!(session_id = %self.id, stage = %self.stage(), "Session reset");
        *self = Self::new();
    }

    fn rejected(&self, to: SessionStage) -> ClaimError {
        ClaimError::InvalidStateTransition {
            from: self.stage().to_string(),
            to: to.to_string(),
        }
    }
}
