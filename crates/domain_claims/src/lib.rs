//! Claim Damage Assessment Domain
//!
//! This crate implements the claim assessment pipeline: collecting claim
//! metadata and damage photos, asking a vision-language model to assess each
//! photo, and turning the answers into a downloadable report.
//!
//! # Session Lifecycle
//!
//! ```text
//! NEW -> IMAGES_COLLECTED -> ANALYZED -> REPORT_READY
//!  ^__________________ reset / new claim __________|
//! ```
//!
//! The model and the spreadsheet writer sit behind the ports in [`ports`];
//! nothing in this crate performs I/O directly.

pub mod claim;
pub mod session;
pub mod assessment;
pub mod parsing;
pub mod report;
pub mod ports;
pub mod services;
pub mod error;

pub use claim::{Claim, ClaimImage, ClaimMetadata, ImageFormat, ImageReference, ImageUpload};
pub use session::{ClaimSession, SessionStage};
pub use assessment::{
    AnalysisOutcome, AnalysisRun, AssessmentRequest, AssessmentRequester, ImageAnalysisResult,
    PromptTemplate,
};
pub use parsing::{parse_assessment, ParsedAssessment, RepairComplexity, Severity};
pub use report::{Cell, CellStyle, Report, ReportBuilder, Sheet};
pub use ports::{ReportRenderer, VisionModelPort};
pub use services::{ClaimAssessmentService, ExportedReport};
pub use error::ClaimError;
