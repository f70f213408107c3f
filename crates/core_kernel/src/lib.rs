//! Core Kernel - Foundational types shared by every crate in the assessor
//!
//! This crate provides the building blocks used across the domain and adapter layers:
//! - Strongly-typed identifiers for sessions and analysis runs
//! - The kernel error type
//! - Port infrastructure for the hexagonal boundary (`PortError`, `DomainPort`)

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{SessionId, AnalysisRunId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort};
