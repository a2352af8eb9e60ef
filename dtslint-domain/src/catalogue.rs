use dtslint_types::{TsTarget, TsVersion, VersionParseError};
use thiserror::Error;

/// Compiler versions the harness knows how to install, oldest first.
pub const DEFAULT_SUPPORTED: &[TsVersion] = &[
    TsVersion::new(5, 0),
    TsVersion::new(5, 1),
    TsVersion::new(5, 2),
    TsVersion::new(5, 3),
    TsVersion::new(5, 4),
    TsVersion::new(5, 5),
    TsVersion::new(5, 6),
    TsVersion::new(5, 7),
    TsVersion::new(5, 8),
    TsVersion::new(5, 9),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("supported version list is empty")]
    Empty,

    #[error("supported versions must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: TsVersion, next: TsVersion },

    #[error(transparent)]
    Parse(#[from] VersionParseError),
}

/// Ordered, non-empty list of installable compiler versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCatalogue {
    versions: Vec<TsVersion>,
}

impl Default for VersionCatalogue {
    fn default() -> Self {
        Self {
            versions: DEFAULT_SUPPORTED.to_vec(),
        }
    }
}

impl VersionCatalogue {
    pub fn new(versions: Vec<TsVersion>) -> Result<Self, CatalogueError> {
        if versions.is_empty() {
            return Err(CatalogueError::Empty);
        }
        for pair in versions.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CatalogueError::NotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { versions })
    }

    pub fn parse<S: AsRef<str>>(versions: &[S]) -> Result<Self, CatalogueError> {
        let parsed = versions
            .iter()
            .map(|v| v.as_ref().parse::<TsVersion>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    pub fn versions(&self) -> &[TsVersion] {
        &self.versions
    }

    pub fn lowest(&self) -> TsVersion {
        self.versions[0]
    }

    pub fn latest(&self) -> TsVersion {
        self.versions[self.versions.len() - 1]
    }

    pub fn contains(&self, v: TsVersion) -> bool {
        self.versions.binary_search(&v).is_ok()
    }

    /// The entry immediately after `v`, or `None` if `v` is unknown or already the newest.
    pub fn next_after(&self, v: TsVersion) -> Option<TsVersion> {
        let idx = self.versions.binary_search(&v).ok()?;
        self.versions.get(idx + 1).copied()
    }

    /// Every version a range covers, inclusive on both ends.
    ///
    /// A `local` bound always expands to just the local build.
    pub fn expand(&self, low: TsTarget, high: TsTarget) -> Vec<TsTarget> {
        let (TsTarget::Version(low), TsTarget::Version(high)) = (low, high) else {
            return vec![TsTarget::Local];
        };
        self.versions
            .iter()
            .copied()
            .filter(|v| *v >= low && *v <= high)
            .map(TsTarget::Version)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> TsVersion {
        s.parse().unwrap()
    }

    #[test]
    fn default_catalogue_is_valid() {
        let cat = VersionCatalogue::default();
        assert_eq!(
            VersionCatalogue::new(DEFAULT_SUPPORTED.to_vec()),
            Ok(cat.clone())
        );
        assert!(cat.lowest() < cat.latest());
    }

    #[test]
    fn rejects_empty_and_unordered_lists() {
        assert_eq!(
            VersionCatalogue::parse::<&str>(&[]),
            Err(CatalogueError::Empty)
        );
        assert!(matches!(
            VersionCatalogue::parse(&["3.1", "3.0"]),
            Err(CatalogueError::NotIncreasing { .. })
        ));
        assert!(matches!(
            VersionCatalogue::parse(&["3.1", "3.1"]),
            Err(CatalogueError::NotIncreasing { .. })
        ));
        assert!(matches!(
            VersionCatalogue::parse(&["3.x"]),
            Err(CatalogueError::Parse(_))
        ));
    }

    #[test]
    fn next_after_walks_the_list() {
        let cat = VersionCatalogue::parse(&["3.9", "3.10", "4.0"]).unwrap();
        assert_eq!(cat.next_after(v("3.9")), Some(v("3.10")));
        assert_eq!(cat.next_after(v("3.10")), Some(v("4.0")));
        assert_eq!(cat.next_after(v("4.0")), None);
        assert_eq!(cat.next_after(v("3.5")), None);
    }

    #[test]
    fn expand_is_inclusive() {
        let cat = VersionCatalogue::parse(&["3.0", "3.1", "3.2", "3.3"]).unwrap();
        let got = cat.expand(v("3.1").into(), v("3.2").into());
        assert_eq!(
            got,
            vec![TsTarget::Version(v("3.1")), TsTarget::Version(v("3.2"))]
        );

        let single = cat.expand(v("3.3").into(), v("3.3").into());
        assert_eq!(single, vec![TsTarget::Version(v("3.3"))]);

        assert_eq!(
            cat.expand(TsTarget::Local, TsTarget::Local),
            vec![TsTarget::Local]
        );
    }
}
