mod config;
mod listen;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use dtslint_core::adapters::{
    CommandTemplate, JsonFileExpectedFailures, ShellCompatChecker, ShellTypeChecker,
};
use dtslint_core::pipeline::{plan_package, run_package};
use dtslint_core::render::{render_ranges_text, render_report_text};
use dtslint_core::settings::RunSettings;
use dtslint_core::PlanMode;
use dtslint_domain::check_layout;
use dtslint_types::report::{PackageReport, ReportStatus, ToolInfo};
use fs_err as fs;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dtslint",
    version,
    about = "Validates DefinitelyTyped packages against every supported TypeScript version."
)]
struct Cli {
    /// Config file (default: nearest dtslint.toml above the package).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one package: conventions, every planned TypeScript version, compatibility.
    Check(CheckArgs),
    /// Check conventions and print the version ranges that would be validated.
    Plan(PlanArgs),
    /// List the supported TypeScript versions.
    Versions(VersionsArgs),
    /// Read JSON requests from stdin and write one JSON report per line.
    Listen(ListenArgs),
}

#[derive(Debug, clap::Args)]
struct TargetArgs {
    /// Package directory (default: current directory).
    #[arg(default_value = ".")]
    path: Utf8PathBuf,

    /// Only test the newest supported TypeScript version.
    #[arg(long, conflicts_with = "local_ts")]
    only_test_ts_next: bool,

    /// Test with a local TypeScript build instead of published versions.
    #[arg(long)]
    local_ts: Option<Utf8PathBuf>,

    /// Add a supported TypeScript version (repeatable).
    #[arg(long = "ts-version")]
    ts_versions: Vec<String>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Only check `$ExpectType` assertions; skips the compatibility check.
    #[arg(long)]
    expect_only: bool,

    /// Skip the compatibility check.
    #[arg(long)]
    skip_compat: bool,

    /// Expected-failure list (default: attw.json next to dtslint.toml).
    #[arg(long)]
    expected_failures: Option<Utf8PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct VersionsArgs {
    /// Add a supported TypeScript version (repeatable).
    #[arg(long = "ts-version")]
    ts_versions: Vec<String>,
}

#[derive(Debug, Parser)]
struct ListenArgs {
    /// Skip the compatibility check for every request.
    #[arg(long)]
    skip_compat: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<u8> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    match cli.cmd {
        Command::Check(args) => cmd_check(args, config),
        Command::Plan(args) => cmd_plan(args, config),
        Command::Versions(args) => cmd_versions(args, config),
        Command::Listen(args) => cmd_listen(args, config),
    }
}

fn cmd_check(args: CheckArgs, config: Option<&Utf8Path>) -> anyhow::Result<u8> {
    let package_dir = resolve_package_dir(&args.target.path)?;
    let merged = merged_config(
        config,
        &package_dir,
        &CliOverrides {
            supported: args.target.ts_versions.clone(),
            skip_compat: args.skip_compat,
            expected_failures: args.expected_failures.clone(),
        },
    )?;
    let settings = run_settings(&merged, package_dir, &args.target, args.expect_only)?;

    let report = execute(&settings, &merged)?;
    match args.format {
        OutputFormat::Text => print!("{}", render_report_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        ),
    }
    Ok(exit_code(report.status))
}

fn cmd_plan(args: PlanArgs, config: Option<&Utf8Path>) -> anyhow::Result<u8> {
    let package_dir = resolve_package_dir(&args.target.path)?;
    let merged = merged_config(
        config,
        &package_dir,
        &CliOverrides {
            supported: args.target.ts_versions.clone(),
            ..Default::default()
        },
    )?;
    let settings = run_settings(&merged, package_dir, &args.target, false)?;

    let plan = match plan_package(&settings) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(e.exit_code());
        }
    };
    match args.format {
        OutputFormat::Text => {
            println!("{}", plan.location.label());
            print!("{}", render_ranges_text(&plan.ranges));
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&plan.ranges).context("serialize ranges")?
        ),
    }
    Ok(0)
}

fn cmd_versions(args: VersionsArgs, config: Option<&Utf8Path>) -> anyhow::Result<u8> {
    let cwd = current_dir()?;
    let merged = merged_config(
        config,
        &cwd,
        &CliOverrides {
            supported: args.ts_versions,
            ..Default::default()
        },
    )?;
    for v in merged.catalogue()?.versions() {
        println!("{v}");
    }
    Ok(0)
}

fn cmd_listen(args: ListenArgs, config: Option<&Utf8Path>) -> anyhow::Result<u8> {
    let tool = tool_info();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    listen::serve(stdin.lock(), stdout.lock(), &tool, |request| {
        let target = TargetArgs {
            path: request.path.clone(),
            only_test_ts_next: request.only_test_ts_next,
            local_ts: None,
            ts_versions: Vec::new(),
        };
        let overrides = CliOverrides {
            skip_compat: args.skip_compat,
            ..Default::default()
        };
        let result = resolve_package_dir(&target.path).and_then(|package_dir| {
            let merged = merged_config(config, &package_dir, &overrides)?;
            let settings = run_settings(&merged, package_dir, &target, request.expect_only)?;
            execute(&settings, &merged)
        });
        result.unwrap_or_else(|e| {
            let mut report = PackageReport::new(tool.clone(), "", request.path.as_str());
            report.status = ReportStatus::Error;
            report.errors.push(format!("{e:#}"));
            report
        })
    })?;
    std::io::stdout().flush().context("flush stdout")?;
    Ok(0)
}

/// Runs the pipeline with the process-backed adapters.
fn execute(settings: &RunSettings, merged: &MergedConfig) -> anyhow::Result<PackageReport> {
    let checker = ShellTypeChecker::new(
        CommandTemplate::new(merged.checker_command.clone()).context("[checker] command")?,
    );
    let compat = ShellCompatChecker::new(
        CommandTemplate::new(merged.compat_command.clone()).context("[compat] command")?,
    );
    let expected = JsonFileExpectedFailures::new(merged.expected_failures.clone());

    let outcome = run_package(settings, &checker, &compat, &expected, tool_info());
    if let Some(e) = &outcome.error {
        debug!(exit_code = e.exit_code(), "package run failed");
    }
    Ok(outcome.report)
}

fn merged_config(
    explicit: Option<&Utf8Path>,
    start: &Utf8Path,
    overrides: &CliOverrides,
) -> anyhow::Result<MergedConfig> {
    // Without a config file, attw.json is looked up at the repository root.
    let fallback_base = check_layout(start)
        .map(|loc| loc.repo_root)
        .unwrap_or_else(|_| start.to_path_buf());
    let loaded = config::load_or_default(explicit, start, &fallback_base)
        .context("load dtslint.toml config")?;
    let merged = ConfigMerger::new(loaded).merge(overrides);
    debug!(
        "merged config: supported={:?}, compat_enabled={}, expected_failures={}",
        merged.supported, merged.compat_enabled, merged.expected_failures
    );
    Ok(merged)
}

fn run_settings(
    merged: &MergedConfig,
    package_dir: Utf8PathBuf,
    target: &TargetArgs,
    expect_only: bool,
) -> anyhow::Result<RunSettings> {
    let mode = if target.local_ts.is_some() {
        PlanMode::Local
    } else if target.only_test_ts_next {
        PlanMode::OnlyLatest
    } else {
        PlanMode::AllVersions
    };
    Ok(RunSettings {
        package_dir,
        catalogue: merged.catalogue()?,
        mode,
        local_ts: target.local_ts.clone(),
        expect_only,
        compat_enabled: merged.compat_enabled,
    })
}

fn resolve_package_dir(path: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    let canonical = fs::canonicalize(path).with_context(|| format!("resolve {}", path))?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|p| anyhow::anyhow!("package path is not UTF-8: {}", p.display()))
}

fn current_dir() -> anyhow::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("read current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("current directory is not UTF-8: {}", p.display()))
}

fn exit_code(status: ReportStatus) -> u8 {
    match status {
        ReportStatus::Pass => 0,
        ReportStatus::Fail => 2,
        ReportStatus::Error => 1,
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "dtslint".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
