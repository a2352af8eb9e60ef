use crate::checks::ConventionError;
use crate::ports::PackageView;
use camino::Utf8Path;
use dtslint_types::TsVersion;
use serde_json::Value;
use tracing::debug;

const PACKAGE_JSON: &str = "package.json";

/// Inputs the range planner needs, read from one package directory.
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    /// Declared `minimumTypeScriptVersion`, if any.
    pub minimum: Option<TsVersion>,
    /// Versions with a `tsX.Y` override directory, strictly increasing.
    pub cutoffs: Vec<TsVersion>,
    pub package_json: Value,
}

pub fn read_metadata(view: &dyn PackageView) -> Result<PackageMetadata, ConventionError> {
    let package_json = read_json(view, Utf8Path::new(PACKAGE_JSON))?;
    let minimum = declared_minimum(view, &package_json)?;
    let cutoffs = discover_cutoffs(view)?;

    debug!(
        package = %view.root(),
        minimum = ?minimum.map(|m| m.to_string()),
        cutoffs = ?cutoffs.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "read package metadata"
    );

    Ok(PackageMetadata {
        minimum,
        cutoffs,
        package_json,
    })
}

/// Reads and parses a JSON file relative to the package root.
pub(crate) fn read_json(view: &dyn PackageView, rel: &Utf8Path) -> Result<Value, ConventionError> {
    let path = view.root().join(rel);
    let contents = view
        .read_to_string(rel)
        .map_err(|e| ConventionError::Unreadable {
            path: path.clone(),
            message: format!("{e:#}"),
        })?;
    serde_json::from_str(&contents).map_err(|e| ConventionError::Unreadable {
        path,
        message: e.to_string(),
    })
}

fn declared_minimum(
    view: &dyn PackageView,
    package_json: &Value,
) -> Result<Option<TsVersion>, ConventionError> {
    let Some(raw) = package_json.get("minimumTypeScriptVersion") else {
        return Ok(None);
    };
    let problem = match raw.as_str().map(str::parse::<TsVersion>) {
        Some(Ok(v)) => return Ok(Some(v)),
        Some(Err(e)) => format!("\"minimumTypeScriptVersion\": {e}"),
        None => "\"minimumTypeScriptVersion\" must be a string".to_string(),
    };
    Err(ConventionError::PackageJson {
        path: view.root().join(PACKAGE_JSON),
        problems: vec![problem],
    })
}

fn discover_cutoffs(view: &dyn PackageView) -> Result<Vec<TsVersion>, ConventionError> {
    let root = view.root().to_path_buf();
    let dirs = view
        .subdirectories()
        .map_err(|e| ConventionError::Unreadable {
            path: root.clone(),
            message: format!("{e:#}"),
        })?;

    let mut cutoffs = Vec::new();
    for name in dirs {
        let Some(parsed) = TsVersion::from_directory_name(&name) else {
            continue;
        };
        let version = parsed.map_err(|source| ConventionError::VersionDirectory {
            path: root.clone(),
            name: name.clone(),
            source,
        })?;
        // A non-canonical spelling like ts5.01 would be planned against a directory that
        // does not exist.
        let expected = version.directory_name();
        if expected != name {
            return Err(ConventionError::NonCanonicalDirectory {
                path: root,
                name,
                expected,
            });
        }
        cutoffs.push(version);
    }

    cutoffs.sort();
    Ok(cutoffs)
}
