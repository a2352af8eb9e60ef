//! End-to-end pipeline runs against temporary packages, with in-memory checkers.

use camino::Utf8PathBuf;
use dtslint_core::adapters::{InMemoryCompatChecker, InMemoryExpectedFailures, InMemoryTypeChecker};
use dtslint_core::pipeline::{PackageOutcome, ToolError, plan_package, run_package};
use dtslint_core::ports::ExpectedFailureSource;
use dtslint_core::settings::RunSettings;
use dtslint_core::PlanMode;
use dtslint_types::report::{ReportStatus, ToolInfo};
use dtslint_types::{CheckOutcome, TsTarget, TsVersion};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

const TSCONFIG: &str = r#"{
    "compilerOptions": {
        "module": "node16",
        "strict": true,
        "types": [],
        "noEmit": true,
        "forceConsistentCasingInFileNames": true
    },
    "files": ["index.d.ts", "foo-tests.ts"]
}"#;

struct Package {
    _tmp: TempDir,
    dir: Utf8PathBuf,
}

/// Writes a valid package at `<tmp>/types/<rel>`.
fn package(rel: &str, version: &str, minimum: Option<&str>, cutoffs: &[&str]) -> Package {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
    let dir = root.join("types").join(rel);
    let name = rel.split('/').next().expect("name");

    let types_name = format!("@types/{name}");
    let mut dev_deps = serde_json::Map::new();
    dev_deps.insert(types_name.clone(), json!("workspace:."));
    let mut pj = json!({
        "private": true,
        "name": types_name,
        "version": version,
        "projects": ["https://example.com"],
        "devDependencies": dev_deps
    });
    if let Some(min) = minimum {
        pj["minimumTypeScriptVersion"] = json!(min);
    }
    if !cutoffs.is_empty() {
        let mut tv = serde_json::Map::new();
        for c in cutoffs {
            tv.insert(format!("<={c}"), json!({ "*": [format!("ts{c}/*")] }));
        }
        pj["typesVersions"] = serde_json::Value::Object(tv);
    }

    let mut typing_dirs = vec![dir.clone()];
    typing_dirs.extend(cutoffs.iter().map(|c| dir.join(format!("ts{c}"))));
    for d in &typing_dirs {
        std::fs::create_dir_all(d).expect("mkdir");
        std::fs::write(d.join("index.d.ts"), "export const x: number;\n").expect("write");
        std::fs::write(d.join("tsconfig.json"), TSCONFIG).expect("write");
    }
    std::fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(&pj).expect("json"),
    )
    .expect("write");

    Package { _tmp: tmp, dir }
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "dtslint".to_string(),
        version: Some("0.1.0".to_string()),
    }
}

fn v(major: u16, minor: u16) -> TsTarget {
    TsVersion::new(major, minor).into()
}

fn run(
    settings: &RunSettings,
    checker: &InMemoryTypeChecker,
    compat: &InMemoryCompatChecker,
    expected: &[&str],
) -> PackageOutcome {
    let expected = InMemoryExpectedFailures::new(expected.iter().copied());
    run_package(settings, checker, compat, &expected, tool())
}

#[test]
fn passing_package_checks_every_version_in_order() {
    let pkg = package("foo", "1.2.9999", None, &["5.3"]);
    let settings = RunSettings::new(pkg.dir.clone());
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&settings, &checker, &compat, &[]);
    assert!(outcome.error.is_none(), "{:?}", outcome.error);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.report.status, ReportStatus::Pass);
    assert_eq!(outcome.report.package, "foo");
    assert_eq!(outcome.report.ranges.len(), 2);

    let calls = checker.calls();
    let seen: Vec<(String, bool, Utf8PathBuf)> = calls
        .iter()
        .map(|c| (c.target.to_string(), c.is_latest, c.dir.clone()))
        .collect();
    let mut expected = Vec::new();
    for minor in 0..=3 {
        expected.push((format!("5.{minor}"), false, pkg.dir.join("ts5.3")));
    }
    for minor in 4..=9 {
        expected.push((format!("5.{minor}"), true, pkg.dir.clone()));
    }
    assert_eq!(seen, expected);
    assert_eq!(outcome.report.versions_checked.len(), 10);

    let compat_summary = outcome.report.compat.expect("compat ran");
    assert_eq!(compat_summary.status, CheckOutcome::Pass);
    assert!(compat_summary.accepted);
    assert!(!compat_summary.expected_failure);
    assert!(outcome.report.run.ended_at.is_some());
}

#[test]
fn declared_minimum_raises_first_version() {
    let pkg = package("foo", "1.2.9999", Some("5.7"), &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        outcome.report.versions_checked,
        vec![v(5, 7), v(5, 8), v(5, 9)]
    );
}

#[test]
fn diagnostics_stop_the_run() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing()
        .fail_on(v(5, 2), vec!["index.d.ts(1,14): error TS1005".to_string()]);
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(outcome.report.status, ReportStatus::Fail);
    assert_eq!(outcome.report.versions_checked, vec![v(5, 0), v(5, 1), v(5, 2)]);
    assert!(matches!(
        outcome.error,
        Some(ToolError::TypeCheck { ref directory, .. }) if directory == "root"
    ));
    assert!(outcome.report.errors[0].contains("TS1005"));
    assert_eq!(compat.calls(), 0);
}

#[test]
fn expected_failure_is_accepted_with_message() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Fail, "Resolution failed");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &["foo"]);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.report.messages.len(), 1);
    assert!(outcome.report.messages[0].contains("\"foo\" is listed in 'failingPackages'"));
    assert!(outcome.report.messages[0].ends_with("Resolution failed"));
    let summary = outcome.report.compat.expect("compat ran");
    assert!(summary.expected_failure && summary.accepted);
}

#[test]
fn stale_expected_failure_is_rejected() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "No problems found");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &["foo"]);
    assert_eq!(outcome.exit_code(), 2);
    assert!(matches!(outcome.error, Some(ToolError::Compat(_))));
    assert!(outcome.report.errors[0].contains("remove it from 'failingPackages'"));
    assert!(!outcome.report.compat.expect("compat ran").accepted);
}

#[test]
fn tool_error_depends_on_allow_list() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Error, "version mismatch");

    let listed = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &["foo"]);
    assert_eq!(listed.exit_code(), 0);
    assert!(listed.report.messages.is_empty());

    let unlisted = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &["bar"]);
    assert_eq!(unlisted.exit_code(), 2);
    assert!(unlisted.report.errors[0].contains("version mismatch"));
}

#[test]
fn older_version_directory_uses_its_own_label() {
    let pkg = package("foo/v1", "1.0.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Fail, "");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &["foo/v1"]);
    assert_eq!(outcome.exit_code(), 0, "{:?}", outcome.error);
    assert_eq!(outcome.report.package, "foo/v1");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &["foo"]);
    assert_eq!(outcome.exit_code(), 2);
}

#[test]
fn only_latest_runs_once_at_root() {
    let pkg = package("foo", "1.2.9999", None, &["5.3"]);
    let settings = RunSettings {
        mode: PlanMode::OnlyLatest,
        ..RunSettings::new(pkg.dir.clone())
    };
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&settings, &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 0);
    let calls = checker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, v(5, 9));
    assert_eq!(calls[0].dir, pkg.dir);
    assert!(calls[0].is_latest);
}

#[test]
fn local_build_is_forwarded() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let settings = RunSettings {
        mode: PlanMode::Local,
        local_ts: Some(Utf8PathBuf::from("/src/TypeScript/built/local")),
        expect_only: true,
        ..RunSettings::new(pkg.dir.clone())
    };
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Fail, "");

    let outcome = run(&settings, &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 0, "{:?}", outcome.error);
    assert_eq!(outcome.report.versions_checked, vec![TsTarget::Local]);

    let calls = checker.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].expect_only);
    assert_eq!(
        calls[0].local_ts.as_deref().map(|p| p.as_str()),
        Some("/src/TypeScript/built/local")
    );
    // expect-only runs skip the compatibility check
    assert_eq!(compat.calls(), 0);
    assert!(outcome.report.compat.is_none());
}

#[test]
fn compat_can_be_disabled() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let settings = RunSettings {
        compat_enabled: false,
        ..RunSettings::new(pkg.dir.clone())
    };
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Fail, "");

    let outcome = run(&settings, &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(compat.calls(), 0);
}

#[test]
fn minimum_above_cutoff_is_a_configuration_error() {
    let pkg = package("foo", "1.2.9999", Some("5.6"), &["5.3"]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.report.status, ReportStatus::Error);
    assert!(outcome.report.errors[0].contains("directory ts5.3"));
    assert!(checker.calls().is_empty());

    let err = plan_package(&RunSettings::new(pkg.dir.clone())).unwrap_err();
    assert!(matches!(err, ToolError::Plan(_)));
}

#[test]
fn cutoff_at_newest_version_is_a_configuration_error() {
    let pkg = package("foo", "1.2.9999", None, &["5.9"]);
    let err = plan_package(&RunSettings::new(pkg.dir.clone())).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("newest supported version"));
}

#[test]
fn convention_failure_reports_package_label() {
    let pkg = package("foo/v1", "1.0.9999", None, &[]);
    std::fs::write(pkg.dir.join("tsconfig.json"), "{}").expect("write");
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 2);
    assert!(matches!(outcome.error, Some(ToolError::Convention(_))));
    assert_eq!(outcome.report.package, "foo/v1");
    assert!(checker.calls().is_empty());
}

#[test]
fn version_like_package_name_is_validated_as_a_package() {
    let pkg = package("v8", "1.0.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&RunSettings::new(pkg.dir.clone()), &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 0, "{:?}", outcome.error);
    assert_eq!(outcome.report.package, "v8");

    let plan = plan_package(&RunSettings::new(pkg.dir.clone())).expect("plan");
    assert_eq!(plan.location.name, "v8");
    assert_eq!(plan.location.older_version, None);
}

#[test]
fn package_outside_types_is_rejected() {
    let tmp = TempDir::new().expect("temp dir");
    let dir = Utf8PathBuf::from_path_buf(tmp.path().join("packages").join("foo")).expect("utf8");
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run(&RunSettings::new(dir), &checker, &compat, &[]);
    assert_eq!(outcome.exit_code(), 2);
    assert!(matches!(outcome.error, Some(ToolError::Convention(_))));
    assert_eq!(outcome.report.package, "foo");
}

struct BrokenAllowList;

impl ExpectedFailureSource for BrokenAllowList {
    fn expected_failures(&self) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("attw.json: expected value at line 1 column 1")
    }
}

#[test]
fn unreadable_allow_list_is_an_internal_error() {
    let pkg = package("foo", "1.2.9999", None, &[]);
    let checker = InMemoryTypeChecker::passing();
    let compat = InMemoryCompatChecker::new(CheckOutcome::Pass, "");

    let outcome = run_package(
        &RunSettings::new(pkg.dir.clone()),
        &checker,
        &compat,
        &BrokenAllowList,
        tool(),
    );
    assert_eq!(outcome.exit_code(), 1);
    assert!(matches!(outcome.error, Some(ToolError::Internal(_))));
    assert!(outcome.report.errors[0].contains("load expected-failure list"));
}
