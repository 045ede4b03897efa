//! Use case orchestration for iacguard.
//!
//! This crate provides the application layer: use cases that wire settings, the ARM parser, the
//! rule catalog and the policy engine into one scan. It is thin and delegates heavy lifting to the
//! library crates.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod report;
mod rules;
mod scan;

pub use report::{serialize_report, write_report};
pub use rules::{RuleInfo, list_rules};
pub use scan::{ScanInput, ScanOutput, exit_code, run_scan};
