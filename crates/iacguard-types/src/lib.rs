//! Stable DTOs and IDs used across the iacguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for scan results and the emitted report
//! - stable string IDs for builtin rules and frameworks
//! - canonical source-relative path handling
//! - the cooperative cancellation context shared by every scan stage

#![forbid(unsafe_code)]

pub mod context;
pub mod fingerprint;
pub mod framework;
pub mod ids;
pub mod path;
pub mod report;
pub mod result;

pub use context::{Cancelled, ScanContext};
pub use framework::Framework;
pub use path::SourcePath;
pub use report::{ScanReport, StatusCounts, ToolMeta, SCHEMA_REPORT_V1};
pub use result::{Range, ScanResult, Severity, Status};
