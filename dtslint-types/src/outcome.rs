use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Verdict reported by the external compatibility checker.
///
/// `Error` is a tool-level problem (crash, version mismatch) and says nothing about the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown compatibility check status '{status}' (expected pass, fail or error)")]
pub struct UnknownOutcome {
    pub status: String,
}

impl CheckOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckOutcome::Pass => "pass",
            CheckOutcome::Fail => "fail",
            CheckOutcome::Error => "error",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckOutcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(CheckOutcome::Pass),
            "fail" => Ok(CheckOutcome::Fail),
            "error" => Ok(CheckOutcome::Error),
            other => Err(UnknownOutcome {
                status: other.to_string(),
            }),
        }
    }
}

/// Raw result of one compatibility-checker run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatReport {
    pub status: CheckOutcome,

    #[serde(default)]
    pub output: String,
}
