//! Claim assessment application service
//!
//! Drives a [`ClaimSession`] through intake, analysis and export using the
//! configured model and renderer ports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::assessment::{AnalysisRun, AssessmentRequester, PromptTemplate};
use crate::claim::{Claim, ClaimMetadata, ImageUpload};
use crate::error::ClaimError;
use crate::ports::{ReportRenderer, VisionModelPort};
use crate::report::ReportBuilder;
use crate::session::ClaimSession;

/// A rendered report ready for download
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub sheet_count: usize,
}

/// Orchestrates the collect -> analyse -> export flow
#[derive(Clone)]
pub struct ClaimAssessmentService {
    model: Arc<dyn VisionModelPort>,
    renderer: Arc<dyn ReportRenderer>,
    prompt: PromptTemplate,
}

impl ClaimAssessmentService {
    pub fn new(model: Arc<dyn VisionModelPort>, renderer: Arc<dyn ReportRenderer>) -> Self {
        Self {
            model,
            renderer,
            prompt: PromptTemplate::default(),
        }
    }

    /// Replaces the default damage assessment prompt
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    /// Validates the form input and starts a new claim in the session
    ///
    /// On error the session is left as it was.
    pub fn submit<'s>(
        &self,
        session: &'s mut ClaimSession,
        metadata: ClaimMetadata,
        description: impl Into<String>,
        uploads: Vec<ImageUpload>,
    ) -> Result<&'s Claim, ClaimError> {
        let claim = Claim::submit(metadata, description, uploads)?;
        session.submit_claim(claim);
        session.claim_for_analysis()
    }

    /// Runs the model over every image of the session's claim
    ///
    /// Individual image failures are part of the returned run; only a missing
    /// claim is an error.
    pub async fn analyze<'s>(
        &self,
        session: &'s mut ClaimSession,
    ) -> Result<&'s AnalysisRun, ClaimError> {
        let run = {
            let claim = session.claim_for_analysis()?;
            AssessmentRequester::new(self.model.as_ref(), &self.prompt)
                .analyze(claim)
                .await
        };

        session.record_analysis(run)?;
        session.report_inputs().map(|(_, run)| run)
    }

    /// Builds and renders the report for the session's latest run
    ///
    /// A rendering failure is returned as [`ClaimError::ReportGeneration`] and
    /// leaves the session unchanged so the export can be retried.
    pub fn export_report(
        &self,
        session: &mut ClaimSession,
        generated_at: DateTime<Utc>,
    ) -> Result<ExportedReport, ClaimError> {
        let exported = {
            let (claim, run) = session.report_inputs()?;
            let report = ReportBuilder::build(claim, run, generated_at)?;
            let bytes = self.renderer.render(&report).map_err(|e| {
                error!(claim_id = %report.claim_id, error = %e, "Report rendering failed");
                ClaimError::ReportGeneration(e.to_string())
            })?;

            ExportedReport {
                file_name: report.file_name(self.renderer.file_extension()),
                content_type: self.renderer.content_type(),
                bytes,
                sheet_count: report.sheet_count(),
            }
        };

        session.mark_report_ready(generated_at)?;
        info!(
            file_name = %exported.file_name,
            sheets = exported.sheet_count,
            bytes = exported.bytes.len(),
            "Report exported"
        );
        Ok(exported)
    }

    /// Discards the session's claim and results
    pub fn reset(&self, session: &mut ClaimSession) {
        session.reset();
    }
}
