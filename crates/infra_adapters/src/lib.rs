//! Infrastructure Adapters
//!
//! This crate provides the outbound adapters behind the claims domain ports:
//!
//! - **Vision model clients** implementing `VisionModelPort` over HTTP, for
//!   OpenAI-compatible chat completion servers and for Ollama
//! - **XLSX renderer** implementing `ReportRenderer`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_adapters::{build_vision_adapter, ModelClientConfig, XlsxReportRenderer};
//!
//! let model = build_vision_adapter(&ModelClientConfig::default())?;
//! let service = ClaimAssessmentService::new(model, Arc::new(XlsxReportRenderer::new()));
//! ```

pub mod config;
pub mod adapters;
pub mod export;

pub use config::{ModelClientConfig, ModelProvider};
pub use adapters::{build_vision_adapter, OllamaVisionAdapter, OpenAiVisionAdapter};
pub use export::{XlsxReportRenderer, XLSX_CONTENT_TYPE};
