//! Claims domain errors

use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("At least one image is required")]
    NoImages,

    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Image {file_name} is empty")]
    EmptyImage { file_name: String },

    #[error("Unsupported image format for {file_name}: only PNG and JPEG are accepted")]
    UnsupportedImageFormat { file_name: String },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Analysis produced {actual} results for {expected} images")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Report generation failed: {0}")]
    ReportGeneration(String),
}

impl ClaimError {
    /// Returns true if the error was caused by missing or invalid user input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ClaimError::NoImages
                | ClaimError::EmptyDescription
                | ClaimError::EmptyImage { .. }
                | ClaimError::UnsupportedImageFormat { .. }
        )
    }
}
