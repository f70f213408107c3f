//! Test Doubles
//!
//! Scripted implementations of the domain ports. The vision model records
//! every request it receives so tests can assert on call count and order.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_claims::{AssessmentRequest, Report, ReportRenderer, VisionModelPort};

type Handler = Box<dyn Fn(&AssessmentRequest) -> Result<String, PortError> + Send + Sync>;

/// Vision model that answers from a script and records its calls
pub struct ScriptedVisionModel {
    handler: Handler,
    calls: Mutex<Vec<AssessmentRequest>>,
}

impl ScriptedVisionModel {
    /// Answers with a custom function of the request
    pub fn with_handler(
        handler: impl Fn(&AssessmentRequest) -> Result<String, PortError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every image with the same text
    pub fn answering(text: &str) -> Self {
        let text = text.to_string();
        Self::with_handler(move |_| Ok(text.clone()))
    }

    /// Answers `Assessment of {file_name}` so results can be matched to images
    pub fn echoing_file_names() -> Self {
        Self::with_handler(|request| Ok(format!("Assessment of {}", request.image.file_name)))
    }

    /// Fails with `ServiceUnavailable` for the given 1-based image indices
    pub fn failing_on(indices: impl IntoIterator<Item = usize>, text: &str) -> Self {
        let failing: HashSet<usize> = indices.into_iter().collect();
        let text = text.to_string();
        Self::with_handler(move |request| {
            if failing.contains(&request.image.index) {
                Err(PortError::ServiceUnavailable {
                    service: "scripted-model".to_string(),
                })
            } else {
                Ok(text.clone())
            }
        })
    }

    /// Every request received so far, in call order
    pub fn calls(&self) -> Vec<AssessmentRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DomainPort for ScriptedVisionModel {}

#[async_trait]
impl VisionModelPort for ScriptedVisionModel {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-vision"
    }

    async fn complete(&self, request: &AssessmentRequest) -> Result<String, PortError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

/// Renders a report as pretty JSON, for tests that do not need a spreadsheet
pub struct JsonReportRenderer;

impl DomainPort for JsonReportRenderer {}

impl ReportRenderer for JsonReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, PortError> {
        serde_json::to_vec_pretty(report).map_err(PortError::transformation)
    }
}

/// Renderer that always fails
pub struct FailingReportRenderer;

impl DomainPort for FailingReportRenderer {}

impl ReportRenderer for FailingReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn file_extension(&self) -> &'static str {
        "bin"
    }

    fn render(&self, _report: &Report) -> Result<Vec<u8>, PortError> {
        Err(PortError::internal("disk full"))
    }
}
