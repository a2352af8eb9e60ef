use crate::outcome::CheckOutcome;
use crate::range::ValidationRange;
use crate::version::TsTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of validating one package directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageReport {
    pub schema: String,
    pub tool: ToolInfo,

    #[serde(default)]
    pub run: RunInfo,

    /// Package label, e.g. `node` or `node/v18`.
    pub package: String,

    /// Package directory as given on the command line.
    pub path: String,

    pub status: ReportStatus,

    #[serde(default)]
    pub ranges: Vec<ValidationRange>,

    #[serde(default)]
    pub versions_checked: Vec<TsTarget>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compat: Option<CompatSummary>,

    /// Informational messages; the run still succeeded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PackageReport {
    pub fn new(tool: ToolInfo, package: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::DTSLINT_REPORT_V1.to_string(),
            tool,
            run: RunInfo::default(),
            package: package.into(),
            path: path.into(),
            status: ReportStatus::Pass,
            ranges: Vec::new(),
            versions_checked: Vec::new(),
            compat: None,
            messages: Vec::new(),
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Overall verdict for a package.
///
/// `Fail` is a validation rejection; `Error` means the run could not be planned or executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatSummary {
    pub status: CheckOutcome,

    /// Whether the package is on the expected-failure allow-list.
    pub expected_failure: bool,

    /// Whether the reconciled outcome was accepted.
    pub accepted: bool,
}
