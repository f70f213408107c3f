//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim damage assessor test suite.
//!
//! # Modules
//!
//! - `fixtures`: Minimal image payloads and canned model answers
//! - `builders`: Builder for claims with sensible defaults
//! - `doubles`: Scripted vision model and report renderers
//! - `assertions`: Helpers for reading exported spreadsheets back
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
