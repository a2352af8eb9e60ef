//! Per-package validation pipeline, extracted from the CLI.
//!
//! The order is fixed: layout, metadata, conventions, range plan, one compiler run per planned
//! version, then the compatibility check. The first failure ends the run.

use crate::ports::{CheckRequest, CompatChecker, ExpectedFailureSource, TypeChecker};
use crate::settings::RunSettings;
use anyhow::Context;
use chrono::Utc;
use dtslint_domain::{
    ConventionError, FsPackageView, PackageLocation, PackageMetadata, PlanError, RangePlanner,
    Rejection, check_conventions, check_layout, read_metadata, reconcile,
};
use dtslint_types::report::{CompatSummary, PackageReport, ReportStatus, ToolInfo};
use dtslint_types::{CheckOutcome, TsTarget, ValidationRange};
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = the package was rejected, 1 = the run could not
/// be planned or executed.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Convention(#[from] ConventionError),

    #[error(
        "TypeScript {target} reported errors for \"{package}\" in {directory}:\n{}",
        .diagnostics.join("\n")
    )]
    TypeCheck {
        package: String,
        target: TsTarget,
        directory: String,
        diagnostics: Vec<String>,
    },

    #[error(transparent)]
    Compat(#[from] Rejection),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    /// True when the package itself is at fault rather than the run.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ToolError::Convention(_) | ToolError::TypeCheck { .. } | ToolError::Compat(_)
        )
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_rejection() { 2 } else { 1 }
    }
}

/// A package that passed the static checks, with its range plan.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub location: PackageLocation,
    pub metadata: PackageMetadata,
    pub ranges: Vec<ValidationRange>,
}

/// Outcome of `run_package`. The report is filled in as far as the run got.
#[derive(Debug)]
pub struct PackageOutcome {
    pub report: PackageReport,
    pub error: Option<ToolError>,
}

impl PackageOutcome {
    pub fn exit_code(&self) -> u8 {
        self.error.as_ref().map_or(0, ToolError::exit_code)
    }
}

/// Checks layout and conventions, then plans every range. Nothing is executed.
pub fn plan_package(settings: &RunSettings) -> Result<PackagePlan, ToolError> {
    let location = check_layout(&settings.package_dir)?;
    plan_located(settings, location)
}

fn plan_located(
    settings: &RunSettings,
    location: PackageLocation,
) -> Result<PackagePlan, ToolError> {
    let view = FsPackageView::new(settings.package_dir.clone());
    let metadata = read_metadata(&view)?;
    check_conventions(&view, &location, &metadata)?;

    let ranges = RangePlanner::new(&settings.catalogue).plan(
        settings.mode,
        metadata.minimum,
        &metadata.cutoffs,
    )?;
    debug!(package = %location.label(), ranges = ranges.len(), "planned package");

    Ok(PackagePlan {
        location,
        metadata,
        ranges,
    })
}

/// Runs the whole validation for one package.
pub fn run_package(
    settings: &RunSettings,
    checker: &dyn TypeChecker,
    compat: &dyn CompatChecker,
    expected: &dyn ExpectedFailureSource,
    tool: ToolInfo,
) -> PackageOutcome {
    let fallback_label = settings
        .package_dir
        .file_name()
        .unwrap_or(settings.package_dir.as_str())
        .to_string();
    let mut report = PackageReport::new(tool, fallback_label, settings.package_dir.as_str());
    report.run.started_at = Some(Utc::now());

    let result = validate(settings, checker, compat, expected, &mut report);

    report.run.ended_at = Some(Utc::now());
    report.status = match &result {
        Ok(()) => ReportStatus::Pass,
        Err(e) if e.is_rejection() => ReportStatus::Fail,
        Err(_) => ReportStatus::Error,
    };
    if let Err(e) = &result {
        warn!(package = %report.package, error = %e, "package failed");
        report.errors.push(e.to_string());
    } else {
        info!(package = %report.package, versions = report.versions_checked.len(), "package passed");
    }

    PackageOutcome {
        report,
        error: result.err(),
    }
}

fn validate(
    settings: &RunSettings,
    checker: &dyn TypeChecker,
    compat: &dyn CompatChecker,
    expected: &dyn ExpectedFailureSource,
    report: &mut PackageReport,
) -> Result<(), ToolError> {
    let location = check_layout(&settings.package_dir)?;
    report.package = location.label();

    let plan = plan_located(settings, location)?;
    report.ranges = plan.ranges.clone();

    for range in &plan.ranges {
        let dir = match &range.directory {
            Some(d) => settings.package_dir.join(d),
            None => settings.package_dir.clone(),
        };
        for target in settings.catalogue.expand(range.low, range.high) {
            info!(
                package = %report.package,
                version = %target,
                directory = range.directory_label(),
                "type-checking"
            );
            let request = CheckRequest {
                package: report.package.clone(),
                dir: dir.clone(),
                target,
                is_latest: range.is_latest,
                expect_only: settings.expect_only,
                local_ts: settings.local_ts.clone(),
            };
            let diagnostics = checker
                .check(&request)
                .with_context(|| format!("type-check {} with TypeScript {target}", dir))?;
            report.versions_checked.push(target);
            if !diagnostics.is_empty() {
                return Err(ToolError::TypeCheck {
                    package: report.package.clone(),
                    target,
                    directory: range.directory_label().to_string(),
                    diagnostics,
                });
            }
        }
    }

    if !settings.compat_enabled || settings.expect_only {
        debug!(package = %report.package, "compatibility check skipped");
        return Ok(());
    }
    check_compat(settings, &plan.location, compat, expected, report)
}

fn check_compat(
    settings: &RunSettings,
    location: &PackageLocation,
    compat: &dyn CompatChecker,
    expected: &dyn ExpectedFailureSource,
    report: &mut PackageReport,
) -> Result<(), ToolError> {
    let label = location.label();
    let expected_failure = expected
        .expected_failures()
        .context("load expected-failure list")?
        .iter()
        .any(|p| *p == label);

    let result = compat
        .check(&settings.package_dir, location)
        .with_context(|| format!("run compatibility check for {label}"))?;
    debug!(package = %label, status = %result.status, expected_failure, "compatibility check finished");

    let verdict = reconcile(result.status, expected_failure, &result.output, &label);
    report.compat = Some(CompatSummary {
        status: result.status,
        expected_failure,
        accepted: verdict.is_ok(),
    });

    match verdict {
        Ok(Some(message)) => {
            info!(package = %label, "{message}");
            report.messages.push(message);
            Ok(())
        }
        Ok(None) => {
            if result.status == CheckOutcome::Error {
                debug!(package = %label, "ignoring compatibility tool error for expected failure");
            }
            Ok(())
        }
        Err(rejection) => Err(rejection.into()),
    }
}
