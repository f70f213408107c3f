//! Per-image assessment against the vision model
//!
//! Images are sent one at a time in upload order. A failure on one image is
//! captured in that image's [`ImageAnalysisResult`] and the loop moves on.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::AnalysisRunId;

use crate::claim::{Claim, ClaimImage, ImageReference};
use crate::parsing::{parse_assessment, ParsedAssessment};
use crate::ports::VisionModelPort;

/// Placeholder replaced by the claim description when a prompt is rendered
pub const DESCRIPTION_PLACEHOLDER: &str = "{description}";

/// Default damage assessment prompt
pub const DAMAGE_ASSESSMENT_PROMPT: &str = "\
You are assisting an insurance claims adjuster with a vehicle damage claim.

The claimant describes the incident as:
\"{description}\"

Examine the damage visible in the attached photo and answer in exactly three sections:

DAMAGE: where the damage is located (e.g. front bumper, rear door), the type of damage \
(dent, scratch, crack, broken part, ...) and its severity (Minor, Moderate or Severe).

REPAIR: the parts that need repair, the suggested repair method and the expected repair \
complexity (Easy, Medium or Complex). End the section with these labelled lines:
Parts to replace: parts likely needing replacement
Inspection areas: areas to check for hidden damage
Repair time: estimated repair time
Specialized tools: whether specialized tools or skills are needed
Safety: safety considerations, starting with \"CRITICAL\" if the vehicle is unsafe to drive

CONSISTENCY: whether the visible damage is consistent with the claimant's description, \
and what, if anything, does not match.";

/// The fixed prompt sent with every image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Creates a template; `{description}` marks where the claim description goes
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn damage_assessment() -> Self {
        Self::new(DAMAGE_ASSESSMENT_PROMPT)
    }

    pub fn render(&self, description: &str) -> String {
        self.template.replace(DESCRIPTION_PLACEHOLDER, description)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::damage_assessment()
    }
}

/// One call to the vision model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRequest {
    /// Which image this call is about
    pub image: ImageReference,
    /// MIME type of the encoded image
    pub mime_type: &'static str,
    /// Base64-encoded image bytes
    pub image_base64: String,
    /// Rendered prompt text
    pub prompt: String,
}

impl AssessmentRequest {
    pub fn for_image(image: &ClaimImage, prompt: String) -> Self {
        Self {
            image: image.reference(),
            mime_type: image.format.mime_type(),
            image_base64: image.to_base64(),
            prompt,
        }
    }
}

/// What came back for one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisOutcome {
    Succeeded {
        raw_text: String,
        parsed: ParsedAssessment,
    },
    Failed {
        error: String,
    },
}

/// Outcome of assessing a single image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysisResult {
    pub image: ImageReference,
    pub outcome: AnalysisOutcome,
    /// Wall time of the model call
    pub elapsed_ms: u64,
}

impl ImageAnalysisResult {
    /// Builds a successful result, parsing what it can from the text
    pub fn succeeded(image: ImageReference, raw_text: impl Into<String>, elapsed_ms: u64) -> Self {
        let raw_text = raw_text.into();
        let parsed = parse_assessment(&raw_text);
        Self {
            image,
            outcome: AnalysisOutcome::Succeeded { raw_text, parsed },
            elapsed_ms,
        }
    }

    pub fn failed(image: ImageReference, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            image,
            outcome: AnalysisOutcome::Failed {
                error: error.into(),
            },
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Succeeded { .. })
    }

    pub fn raw_text(&self) -> Option<&str> {
        match &self.outcome {
            AnalysisOutcome::Succeeded { raw_text, .. } => Some(raw_text),
            AnalysisOutcome::Failed { .. } => None,
        }
    }

    pub fn parsed(&self) -> Option<&ParsedAssessment> {
        match &self.outcome {
            AnalysisOutcome::Succeeded { parsed, .. } => Some(parsed),
            AnalysisOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            AnalysisOutcome::Succeeded { .. } => None,
            AnalysisOutcome::Failed { error } => Some(error),
        }
    }
}

/// All results of one analysis pass over a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: AnalysisRunId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// One entry per image, in upload order
    pub results: Vec<ImageAnalysisResult>,
}

impl AnalysisRun {
    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.succeeded_count()
    }
}

/// Sends each image of a claim to the vision model
pub struct AssessmentRequester<'a> {
    model: &'a dyn VisionModelPort,
    prompt: &'a PromptTemplate,
}

impl<'a> AssessmentRequester<'a> {
    pub fn new(model: &'a dyn VisionModelPort, prompt: &'a PromptTemplate) -> Self {
        Self { model, prompt }
    }

    /// Assesses every image of the claim, one call per image, in upload order
    pub async fn analyze(&self, claim: &Claim) -> AnalysisRun {
        let id = AnalysisRunId::new();
        let started_at = Utc::now();
        let prompt = self.prompt.render(&claim.description);

        info!(
            run_id = %id,
            claim_id = %claim.claim_id(),
            images = claim.image_count(),
            provider = self.model.provider(),
            model = self.model.model(),
            "Starting claim analysis"
        );

        let mut results = Vec::with_capacity(claim.image_count());
        for image in &claim.images {
            results.push(self.assess_image(image, prompt.clone()).await);
        }

        let run = AnalysisRun {
            id,
            started_at,
            completed_at: Utc::now(),
            results,
        };

        info!(
            run_id = %run.id,
            succeeded = run.succeeded_count(),
            failed = run.failed_count(),
            "Claim analysis finished"
        );

        run
    }

    /// Assesses one image; never fails, errors become a failed result
    pub async fn assess_image(&self, image: &ClaimImage, prompt: String) -> ImageAnalysisResult {
        let request = AssessmentRequest::for_image(image, prompt);
        let reference = request.image.clone();
        let start = Instant::now();

        let response = self.model.complete(&request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match response {
            Ok(text) if !text.trim().is_empty() => {
                info!(image = %reference, elapsed_ms, "Image assessed");
                ImageAnalysisResult::succeeded(reference, text.trim(), elapsed_ms)
            }
            Ok(_) => {
                warn!(image = %reference, "Model returned an empty assessment");
                ImageAnalysisResult::failed(reference, "Model returned an empty assessment", elapsed_ms)
            }
            Err(e) => {
                warn!(image = %reference, error = %e, "Image assessment failed");
                ImageAnalysisResult::failed(reference, e.to_string(), elapsed_ms)
            }
        }
    }
}
