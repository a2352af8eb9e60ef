//! Shared DTOs for the dtslint workspace.
//!
//! # Design constraints
//! - Reports are serialized to stdout (`--format json`, listen mode) and consumed by other tools.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod outcome;
pub mod range;
pub mod report;
pub mod version;

pub use outcome::{CheckOutcome, CompatReport, UnknownOutcome};
pub use range::ValidationRange;
pub use version::{TsTarget, TsVersion, VersionParseError};

/// Schema identifiers.
pub mod schema {
    pub const DTSLINT_REPORT_V1: &str = "dtslint.report.v1";
}
