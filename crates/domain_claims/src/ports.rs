//! Ports at the edge of the claims domain
//!
//! The domain never talks HTTP or writes spreadsheets itself. Adapters in
//! `infra_adapters` implement these traits.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::assessment::AssessmentRequest;
use crate::report::Report;

/// A hosted multimodal model that answers a prompt about an image
#[async_trait]
pub trait VisionModelPort: DomainPort {
    /// Provider name for logs and reports
    fn provider(&self) -> &str;

    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Sends one prompt plus image and returns the model's free-text answer
    async fn complete(&self, request: &AssessmentRequest) -> Result<String, PortError>;
}

/// Turns a [`Report`] into a downloadable byte stream
pub trait ReportRenderer: DomainPort {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    /// File extension, without the dot
    fn file_extension(&self) -> &'static str;

    fn render(&self, report: &Report) -> Result<Vec<u8>, PortError>;
}
