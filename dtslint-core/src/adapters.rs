//! Default process- and file-backed port implementations, plus in-memory ones.

use crate::ports::{CheckRequest, CompatChecker, ExpectedFailureSource, TypeChecker};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use dtslint_domain::PackageLocation;
use dtslint_types::{CheckOutcome, CompatReport, TsTarget};
use fs_err as fs;
use serde::Deserialize;
use std::process::{Command, Output};
use std::sync::Mutex;
use tracing::debug;

/// An argv with `{placeholder}` substitution.
///
/// Placeholders: `{version}` (`X.Y`, or the local compiler path), `{dir}` (directory being
/// checked), `{package}` (package label) and `{name}` (npm name, `@types/...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    argv: Vec<String>,
}

impl CommandTemplate {
    pub fn new(argv: Vec<String>) -> anyhow::Result<Self> {
        if argv.is_empty() {
            anyhow::bail!("command must name a program");
        }
        Ok(Self { argv })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn render(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.argv
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }

    fn run(
        &self,
        vars: &[(&str, &str)],
        cwd: &Utf8Path,
        envs: &[(&str, &str)],
    ) -> anyhow::Result<Output> {
        let argv = self.render(vars);
        let (program, args) = argv
            .split_first()
            .context("command must name a program")?;
        debug!(program = %program, ?args, cwd = %cwd, "spawning");
        Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(envs.iter().copied())
            .output()
            .with_context(|| format!("run {}", argv.join(" ")))
    }
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut text = stdout.trim_end().to_string();
    if !stderr.trim().is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(stderr.trim_end());
    }
    text
}

/// Type-checks by running an external command once per version.
///
/// The command sees `DTSLINT_IS_LATEST` and `DTSLINT_EXPECT_ONLY` (`1` or `0`) in its
/// environment. A zero exit status means no diagnostics; otherwise each non-empty output line is one.
#[derive(Debug, Clone)]
pub struct ShellTypeChecker {
    template: CommandTemplate,
}

impl ShellTypeChecker {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl TypeChecker for ShellTypeChecker {
    fn check(&self, request: &CheckRequest) -> anyhow::Result<Vec<String>> {
        let version = match (request.target, &request.local_ts) {
            (TsTarget::Local, Some(path)) => path.to_string(),
            (TsTarget::Local, None) => {
                anyhow::bail!("a local compiler run was planned but no compiler path was given")
            }
            (TsTarget::Version(v), _) => v.to_string(),
        };
        let flag = |b: bool| if b { "1" } else { "0" };

        let output = self.template.run(
            &[
                ("version", version.as_str()),
                ("dir", request.dir.as_str()),
                ("package", request.package.as_str()),
            ],
            &request.dir,
            &[
                ("DTSLINT_IS_LATEST", flag(request.is_latest)),
                ("DTSLINT_EXPECT_ONLY", flag(request.expect_only)),
            ],
        )?;

        if output.status.success() {
            return Ok(Vec::new());
        }
        let mut diagnostics: Vec<String> = combined_output(&output)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        if diagnostics.is_empty() {
            diagnostics.push(format!("checker exited with {}", output.status));
        }
        Ok(diagnostics)
    }
}

/// Runs the compatibility checker as an external command.
///
/// If stdout is a JSON object with a `status` field it is taken as the report. Otherwise the exit
/// status decides: 0 is `pass`, 1 is `fail`, anything else (including a failure to spawn) is
/// `error`.
#[derive(Debug, Clone)]
pub struct ShellCompatChecker {
    template: CommandTemplate,
}

impl ShellCompatChecker {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl CompatChecker for ShellCompatChecker {
    fn check(
        &self,
        package_dir: &Utf8Path,
        location: &PackageLocation,
    ) -> anyhow::Result<CompatReport> {
        let label = location.label();
        let name = location.types_name();
        let vars = [
            ("dir", package_dir.as_str()),
            ("package", label.as_str()),
            ("name", name.as_str()),
        ];
        let output = match self.template.run(&vars, package_dir, &[]) {
            Ok(output) => output,
            Err(e) => {
                return Ok(CompatReport {
                    status: CheckOutcome::Error,
                    output: format!("{e:#}"),
                });
            }
        };

        if let Some(report) = parse_json_report(&String::from_utf8_lossy(&output.stdout))? {
            return Ok(report);
        }

        let status = match output.status.code() {
            Some(0) => CheckOutcome::Pass,
            Some(1) => CheckOutcome::Fail,
            _ => CheckOutcome::Error,
        };
        Ok(CompatReport {
            status,
            output: combined_output(&output),
        })
    }
}

/// An unknown `status` is a contract violation, not a verdict.
fn parse_json_report(stdout: &str) -> anyhow::Result<Option<CompatReport>> {
    let trimmed = stdout.trim();
    if !trimmed.starts_with('{') {
        return Ok(None);
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Ok(None);
    };
    if value.get("status").is_none() {
        return Ok(None);
    }
    let report = serde_json::from_value(value)
        .context("compatibility checker reported an unrecognized status")?;
    Ok(Some(report))
}

#[derive(Debug, Deserialize)]
struct AllowList {
    #[serde(rename = "failingPackages", default)]
    failing_packages: Vec<String>,
}

/// Reads `failingPackages` from a JSON allow-list file. A missing file means nothing is expected
/// to fail.
#[derive(Debug, Clone)]
pub struct JsonFileExpectedFailures {
    pub path: Utf8PathBuf,
}

impl JsonFileExpectedFailures {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl ExpectedFailureSource for JsonFileExpectedFailures {
    fn expected_failures(&self) -> anyhow::Result<Vec<String>> {
        if !self.path.exists() {
            debug!(path = %self.path, "no expected-failure list");
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let list: AllowList =
            serde_json::from_str(&text).with_context(|| format!("parse {}", self.path))?;
        Ok(list.failing_packages)
    }
}

/// In-memory type checker for embedding and testing.
///
/// Passes every request except those whose target was registered with `fail_on`. Records every
/// request it sees.
#[derive(Debug, Default)]
pub struct InMemoryTypeChecker {
    failures: Vec<(TsTarget, Vec<String>)>,
    calls: Mutex<Vec<CheckRequest>>,
}

impl InMemoryTypeChecker {
    pub fn passing() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, target: TsTarget, diagnostics: Vec<String>) -> Self {
        self.failures.push((target, diagnostics));
        self
    }

    pub fn calls(&self) -> Vec<CheckRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TypeChecker for InMemoryTypeChecker {
    fn check(&self, request: &CheckRequest) -> anyhow::Result<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        Ok(self
            .failures
            .iter()
            .find(|(target, _)| *target == request.target)
            .map(|(_, diagnostics)| diagnostics.clone())
            .unwrap_or_default())
    }
}

/// In-memory compatibility checker returning a fixed report.
#[derive(Debug)]
pub struct InMemoryCompatChecker {
    report: CompatReport,
    calls: Mutex<usize>,
}

impl InMemoryCompatChecker {
    pub fn new(status: CheckOutcome, output: impl Into<String>) -> Self {
        Self {
            report: CompatReport {
                status,
                output: output.into(),
            },
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CompatChecker for InMemoryCompatChecker {
    fn check(&self, _: &Utf8Path, _: &PackageLocation) -> anyhow::Result<CompatReport> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(self.report.clone())
    }
}

/// In-memory allow-list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExpectedFailures {
    packages: Vec<String>,
}

impl InMemoryExpectedFailures {
    pub fn new<S: Into<String>>(packages: impl IntoIterator<Item = S>) -> Self {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExpectedFailureSource for InMemoryExpectedFailures {
    fn expected_failures(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.packages.clone())
    }
}
