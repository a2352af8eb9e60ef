//! Clap-free settings for one package run.

use camino::Utf8PathBuf;
use dtslint_domain::{PlanMode, VersionCatalogue};

/// Settings for `run_package` and `plan_package`.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Absolute package directory: `<root>/types/<name>` or an older-version directory below it.
    pub package_dir: Utf8PathBuf,
    pub catalogue: VersionCatalogue,
    pub mode: PlanMode,

    /// Compiler build used in `PlanMode::Local`.
    pub local_ts: Option<Utf8PathBuf>,

    // Checker behaviour
    pub expect_only: bool,

    // Compatibility check
    pub compat_enabled: bool,
}

impl RunSettings {
    pub fn new(package_dir: Utf8PathBuf) -> Self {
        Self {
            package_dir,
            ..Self::default()
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            package_dir: Utf8PathBuf::from("."),
            catalogue: VersionCatalogue::default(),
            mode: PlanMode::default(),
            local_ts: None,
            expect_only: false,
            compat_enabled: true,
        }
    }
}
