use dtslint_types::CheckOutcome;
use thiserror::Error;

/// Key of the expected-failure list in the allow-list file.
pub const EXPECTED_FAILURES_KEY: &str = "failingPackages";

/// A compatibility-check result the build must not accept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error(
        "compatibility check passed for \"{package}\": remove it from 'failingPackages' \
         in the expected-failure list\n\n{output}"
    )]
    StaleExpectation { package: String, output: String },

    #[error("compatibility check reported {outcome} for \"{package}\"\n\n{output}")]
    Failed {
        package: String,
        outcome: CheckOutcome,
        output: String,
    },
}

/// Combines a compatibility-check outcome with the package's allow-list status.
///
/// `Ok(Some(_))` is accepted with an informational message; `Ok(None)` is accepted silently.
pub fn reconcile(
    outcome: CheckOutcome,
    expected: bool,
    raw_output: &str,
    package_label: &str,
) -> Result<Option<String>, Rejection> {
    match (expected, outcome) {
        // A tool error on a package already known to fail is not actionable.
        (true, CheckOutcome::Error) => Ok(None),
        (true, CheckOutcome::Fail) => Ok(Some(format!(
            "Ignoring compatibility check failure because \"{package_label}\" is listed in \
             '{EXPECTED_FAILURES_KEY}'.\n\n{raw_output}"
        ))),
        (true, CheckOutcome::Pass) => Err(Rejection::StaleExpectation {
            package: package_label.to_string(),
            output: raw_output.to_string(),
        }),
        (false, outcome @ (CheckOutcome::Error | CheckOutcome::Fail)) => Err(Rejection::Failed {
            package: package_label.to_string(),
            outcome,
            output: raw_output.to_string(),
        }),
        (false, CheckOutcome::Pass) => Ok(None),
    }
}
