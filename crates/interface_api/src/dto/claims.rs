//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use domain_claims::{
    AnalysisRun, Claim, ClaimSession, ImageAnalysisResult, RepairComplexity, SessionStage, Severity,
};

/// Current state of the claim session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub stage: SessionStage,
    pub started_at: DateTime<Utc>,
    pub claim: Option<ClaimResponse>,
    pub analysis: Option<AnalysisSummary>,
    pub report_generated_at: Option<DateTime<Utc>>,
}

impl From<&ClaimSession> for SessionResponse {
    fn from(session: &ClaimSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            stage: session.stage(),
            started_at: session.started_at(),
            claim: session.claim().map(ClaimResponse::from),
            analysis: session.analysis().map(AnalysisSummary::from),
            report_generated_at: session.report_generated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claim_id: String,
    pub policy_number: String,
    pub incident_date: Option<NaiveDate>,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
    pub images: Vec<ImageSummary>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            claim_id: claim.metadata.claim_id.clone(),
            policy_number: claim.metadata.policy_number.clone(),
            incident_date: claim.metadata.incident_date,
            description: claim.description.clone(),
            submitted_at: claim.submitted_at,
            images: claim
                .images
                .iter()
                .map(|image| ImageSummary {
                    index: image.index,
                    file_name: image.file_name.clone(),
                    format: image.format.label(),
                    size_bytes: image.size_bytes(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub index: usize,
    pub file_name: String,
    pub format: &'static str,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub run_id: String,
    pub completed_at: DateTime<Utc>,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<&AnalysisRun> for AnalysisSummary {
    fn from(run: &AnalysisRun) -> Self {
        Self {
            run_id: run.id.to_string(),
            completed_at: run.completed_at,
            succeeded: run.succeeded_count(),
            failed: run.failed_count(),
        }
    }
}

/// Full result of an analysis run
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ImageResultResponse>,
}

impl From<&AnalysisRun> for AnalysisResponse {
    fn from(run: &AnalysisRun) -> Self {
        Self {
            run_id: run.id.to_string(),
            started_at: run.started_at,
            completed_at: run.completed_at,
            succeeded: run.succeeded_count(),
            failed: run.failed_count(),
            results: run.results.iter().map(ImageResultResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct ImageResultResponse {
    pub index: usize,
    pub file_name: String,
    pub status: ResultStatus,
    pub elapsed_ms: u64,
    pub location: Option<String>,
    pub damage_type: Option<String>,
    pub severity: Option<Severity>,
    pub repair_complexity: Option<RepairComplexity>,
    pub replacement_parts: Option<String>,
    pub inspection_areas: Option<String>,
    pub repair_time: Option<String>,
    pub specialized_requirements: Option<String>,
    pub safety_notes: Option<String>,
    pub damage: Option<String>,
    pub repair: Option<String>,
    pub consistency: Option<String>,
    pub raw_text: Option<String>,
    pub error: Option<String>,
}

impl From<&ImageAnalysisResult> for ImageResultResponse {
    fn from(result: &ImageAnalysisResult) -> Self {
        let parsed = result.parsed().cloned().unwrap_or_default();
        Self {
            index: result.image.index,
            file_name: result.image.file_name.clone(),
            status: if result.is_success() {
                ResultStatus::Succeeded
            } else {
                ResultStatus::Failed
            },
            elapsed_ms: result.elapsed_ms,
            location: parsed.location,
            damage_type: parsed.damage_type,
            severity: parsed.severity,
            repair_complexity: parsed.repair_complexity,
            replacement_parts: parsed.replacement_parts,
            inspection_areas: parsed.inspection_areas,
            repair_time: parsed.repair_time,
            specialized_requirements: parsed.specialized_requirements,
            safety_notes: parsed.safety_notes,
            damage: parsed.damage,
            repair: parsed.repair,
            consistency: parsed.consistency,
            raw_text: result.raw_text().map(str::to_string),
            error: result.error().map(str::to_string),
        }
    }
}
