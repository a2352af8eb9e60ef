use super::ConventionError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

const TYPES_DIR: &str = "types";

/// A `vN` or `vN.M` directory holding typings for an older major version of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OlderVersion {
    pub major: u32,
    pub minor: Option<u32>,
}

impl OlderVersion {
    pub fn from_directory_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('v')?;
        let (major, minor) = match rest.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (rest, None),
        };
        let number = |s: &str| {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                s.parse::<u32>().ok()
            }
        };
        Some(Self {
            major: number(major)?,
            minor: match minor {
                Some(m) => Some(number(m)?),
                None => None,
            },
        })
    }
}

impl fmt::Display for OlderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "v{}.{}", self.major, minor),
            None => write!(f, "v{}", self.major),
        }
    }
}

/// Where a package sits inside the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    /// Repository root: the parent of `types/`.
    pub repo_root: Utf8PathBuf,
    /// Typings directory name, e.g. `node` or `babel__core`.
    pub name: String,
    pub older_version: Option<OlderVersion>,
}

impl PackageLocation {
    /// Short label used in messages and matched against the expected-failure list.
    pub fn label(&self) -> String {
        match self.older_version {
            Some(v) => format!("{}/{}", self.name, v),
            None => self.name.clone(),
        }
    }

    /// The npm name the package is published under.
    pub fn types_name(&self) -> String {
        format!("@types/{}", self.name)
    }
}

/// Ensures `package_dir` is `<root>/types/<name>` or `<root>/types/<name>/v<N>`.
///
/// `package_dir` should be absolute and normalized; this is pure path logic.
pub fn check_layout(package_dir: &Utf8Path) -> Result<PackageLocation, ConventionError> {
    let layout_error = || ConventionError::Layout {
        path: package_dir.to_path_buf(),
    };

    let last = package_dir.file_name().ok_or_else(layout_error)?;
    // `types/v8` is a package named `v8`, not an older version of `types`.
    let older_version = OlderVersion::from_directory_name(last).filter(|_| {
        package_dir
            .parent()
            .and_then(Utf8Path::parent)
            .and_then(Utf8Path::file_name)
            == Some(TYPES_DIR)
    });
    let name_dir = match older_version {
        Some(_) => package_dir.parent().ok_or_else(layout_error)?,
        None => package_dir,
    };

    let name = name_dir.file_name().ok_or_else(layout_error)?;
    let types_dir = name_dir.parent().ok_or_else(layout_error)?;
    if types_dir.file_name() != Some(TYPES_DIR) {
        return Err(layout_error());
    }
    let repo_root = types_dir.parent().ok_or_else(layout_error)?;

    Ok(PackageLocation {
        repo_root: repo_root.to_path_buf(),
        name: name.to_string(),
        older_version,
    })
}
