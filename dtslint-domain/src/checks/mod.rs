//! Repository-layout and package-convention checks.
//!
//! Each check collects every problem it finds so a package author can fix them in one pass.

mod layout;
mod package_json;
mod tsconfig;

pub use layout::{OlderVersion, PackageLocation, check_layout};
pub use package_json::check_package_json;
pub use tsconfig::check_tsconfig;

use crate::metadata::{PackageMetadata, read_json};
use crate::ports::PackageView;
use camino::Utf8PathBuf;
use dtslint_types::VersionParseError;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConventionError {
    #[error(
        "{path} is not inside a DefinitelyTyped checkout: expected <root>/types/<name> \
         or <root>/types/<name>/v<N>"
    )]
    Layout { path: Utf8PathBuf },

    #[error("{path} is missing")]
    MissingFile { path: Utf8PathBuf },

    #[error("{path} could not be read: {message}")]
    Unreadable { path: Utf8PathBuf, message: String },

    #[error("{path} has problems:\n  - {}", .problems.join("\n  - "))]
    PackageJson {
        path: Utf8PathBuf,
        problems: Vec<String>,
    },

    #[error("{path} has problems:\n  - {}", .problems.join("\n  - "))]
    Tsconfig {
        path: Utf8PathBuf,
        problems: Vec<String>,
    },

    #[error("there is an entry named {name} in {path}, but it is not a valid TypeScript version")]
    VersionDirectory {
        path: Utf8PathBuf,
        name: String,
        #[source]
        source: VersionParseError,
    },

    #[error("directory {name} in {path} should be spelled {expected}")]
    NonCanonicalDirectory {
        path: Utf8PathBuf,
        name: String,
        expected: String,
    },
}

/// Runs the `package.json` check and the `tsconfig.json` check for the root and every `tsX.Y`
/// directory. Stops at the first file with problems.
pub fn check_conventions(
    view: &dyn PackageView,
    location: &PackageLocation,
    metadata: &PackageMetadata,
) -> Result<(), ConventionError> {
    let problems = check_package_json(&metadata.package_json, location, &metadata.cutoffs);
    if !problems.is_empty() {
        return Err(ConventionError::PackageJson {
            path: view.root().join("package.json"),
            problems,
        });
    }

    let dirs = std::iter::once(Utf8PathBuf::new()).chain(
        metadata
            .cutoffs
            .iter()
            .map(|c| Utf8PathBuf::from(c.directory_name())),
    );
    for dir in dirs {
        let index = dir.join("index.d.ts");
        if !view.exists(&index) {
            return Err(ConventionError::MissingFile {
                path: view.root().join(index),
            });
        }

        let rel = dir.join("tsconfig.json");
        debug!(path = %rel, "checking tsconfig");
        let json = read_json(view, &rel)?;
        let problems = check_tsconfig(&json);
        if !problems.is_empty() {
            return Err(ConventionError::Tsconfig {
                path: view.root().join(&rel),
                problems,
            });
        }
    }

    Ok(())
}
