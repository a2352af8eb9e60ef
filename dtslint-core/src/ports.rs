//! Port traits abstracting the external tools away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use dtslint_domain::PackageLocation;
use dtslint_types::{CompatReport, TsTarget};

/// One compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// Package label, e.g. `node` or `node/v18`.
    pub package: String,
    /// Directory to type-check: the package root or one of its `tsX.Y` directories.
    pub dir: Utf8PathBuf,
    pub target: TsTarget,
    /// Set for the root range, where the full lint rule set applies.
    pub is_latest: bool,
    pub expect_only: bool,
    /// Compiler build to use when `target` is `TsTarget::Local`.
    pub local_ts: Option<Utf8PathBuf>,
}

/// Runs one compiler version against one directory.
pub trait TypeChecker {
    /// Returns the diagnostics; an empty list means the directory type-checks.
    fn check(&self, request: &CheckRequest) -> anyhow::Result<Vec<String>>;
}

/// Runs the external compatibility checker against the package.
pub trait CompatChecker {
    fn check(
        &self,
        package_dir: &Utf8Path,
        location: &PackageLocation,
    ) -> anyhow::Result<CompatReport>;
}

/// Source of the known-failing allow-list.
pub trait ExpectedFailureSource {
    /// Package labels expected to fail the compatibility check.
    fn expected_failures(&self) -> anyhow::Result<Vec<String>>;
}
