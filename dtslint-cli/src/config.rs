//! Configuration file loading for dtslint.
//!
//! Discovers `dtslint.toml` by walking up from the package directory, normally finding the one at
//! the repository root. Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use dtslint_domain::{DEFAULT_SUPPORTED, VersionCatalogue};
use dtslint_types::TsVersion;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "dtslint.toml";

/// Top-level configuration from dtslint.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DtslintConfig {
    pub versions: VersionsConfig,
    pub checker: CheckerConfig,
    pub compat: CompatConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// Installable compiler versions, `X.Y`. Empty means the built-in list.
    pub supported: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Type-checker argv; `{version}`, `{dir}` and `{package}` are substituted.
    pub command: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            command: argv(&[
                "npx",
                "-p",
                "typescript@{version}",
                "tsc",
                "--noEmit",
                "-p",
                "{dir}",
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    /// Compatibility-checker argv; `{dir}`, `{package}` and `{name}` are substituted.
    pub command: Vec<String>,

    /// Allow-list with a `failingPackages` array, relative to the config file.
    pub expected_failures: Utf8PathBuf,

    pub enabled: bool,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            command: argv(&["npx", "@arethetypeswrong/cli", "--pack", "{dir}"]),
            expected_failures: Utf8PathBuf::from("attw.json"),
            enabled: true,
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Discover the dtslint.toml config file.
///
/// Checks `start` and each of its ancestors. Returns `None` if no config file is found.
pub fn discover_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("found config file at {}", candidate);
            return Some(candidate);
        }
    }
    debug!("no {} found above {}", CONFIG_FILE_NAME, start);
    None
}

/// Load and parse a dtslint.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<DtslintConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<DtslintConfig> {
    let config: DtslintConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// A loaded config and the directory relative paths in it resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DtslintConfig,
    pub base_dir: Utf8PathBuf,
}

/// Use `explicit` if given, else discover from `start`, else defaults based at `fallback_base`.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    start: &Utf8Path,
    fallback_base: &Utf8Path,
) -> anyhow::Result<LoadedConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config(start),
    };
    match path {
        Some(path) => Ok(LoadedConfig {
            config: load_config(&path)?,
            base_dir: path
                .parent()
                .map(Utf8Path::to_path_buf)
                .unwrap_or_else(|| Utf8PathBuf::from(".")),
        }),
        None => Ok(LoadedConfig {
            config: DtslintConfig::default(),
            base_dir: fallback_base.to_path_buf(),
        }),
    }
}

/// CLI values that can override the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Extra supported versions (`--ts-version`).
    pub supported: Vec<String>,
    pub skip_compat: bool,
    pub expected_failures: Option<Utf8PathBuf>,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// Supported versions (from config file, extended by CLI).
    pub supported: Vec<String>,

    pub checker_command: Vec<String>,
    pub compat_command: Vec<String>,
    pub compat_enabled: bool,

    /// Absolute or cwd-relative path of the allow-list.
    pub expected_failures: Utf8PathBuf,
}

impl MergedConfig {
    /// The supported list as a catalogue: sorted and deduplicated, or the built-in list if empty.
    pub fn catalogue(&self) -> anyhow::Result<VersionCatalogue> {
        if self.supported.is_empty() {
            return Ok(VersionCatalogue::default());
        }
        let mut versions = self
            .supported
            .iter()
            .map(|s| s.parse::<TsVersion>())
            .collect::<Result<Vec<_>, _>>()
            .context("parse supported versions")?;
        versions.sort();
        versions.dedup();
        VersionCatalogue::new(versions).context("build version catalogue")
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    loaded: LoadedConfig,
}

impl ConfigMerger {
    pub fn new(loaded: LoadedConfig) -> Self {
        Self { loaded }
    }

    /// CLI `supported` extends the config list; CLI `skip_compat` and `expected_failures`
    /// override it.
    pub fn merge(self, cli: &CliOverrides) -> MergedConfig {
        let LoadedConfig { config, base_dir } = self.loaded;

        let mut supported = config.versions.supported;
        // An empty list means the built-in one; CLI versions extend it rather than replace it.
        if supported.is_empty() && !cli.supported.is_empty() {
            supported = DEFAULT_SUPPORTED.iter().map(ToString::to_string).collect();
        }
        for v in &cli.supported {
            if !supported.contains(v) {
                supported.push(v.clone());
            }
        }

        let expected_failures = match &cli.expected_failures {
            Some(path) => path.clone(),
            None => base_dir.join(&config.compat.expected_failures),
        };

        MergedConfig {
            supported,
            checker_command: config.checker.command,
            compat_command: config.compat.command,
            compat_enabled: config.compat.enabled && !cli.skip_compat,
            expected_failures,
        }
    }
}
