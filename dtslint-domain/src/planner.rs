use crate::catalogue::VersionCatalogue;
use dtslint_types::{TsTarget, TsVersion, ValidationRange};
use thiserror::Error;
use tracing::debug;

/// Which compiler versions a run should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    /// Every catalogue version from the package minimum up to the newest.
    #[default]
    AllVersions,
    /// Only the newest catalogue version, at the package root.
    OnlyLatest,
    /// A single ad-hoc local compiler build, at the package root.
    Local,
}

/// Configuration errors that make the plan untrustworthy. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error(
        "directory ts{version} targets TypeScript {version}, which is not a supported version"
    )]
    UnknownVersion { version: TsVersion },

    #[error(
        "directory ts{version} targets TypeScript {version}, the newest supported version; \
         no version remains above it for the package root"
    )]
    NoNextVersion { version: TsVersion },

    #[error(
        "the minimumTypeScriptVersion {minimum} in package.json is higher than \
         the TypeScript version of the directory {directory}"
    )]
    MinimumAboveDirectory {
        minimum: TsVersion,
        directory: String,
    },
}

pub struct RangePlanner<'a> {
    catalogue: &'a VersionCatalogue,
}

impl<'a> RangePlanner<'a> {
    pub fn new(catalogue: &'a VersionCatalogue) -> Self {
        Self { catalogue }
    }

    /// The larger of the declared minimum and the lowest installable version.
    pub fn effective_minimum(&self, minimum: Option<TsVersion>) -> TsVersion {
        let lowest = self.catalogue.lowest();
        minimum.map_or(lowest, |m| m.max(lowest))
    }

    /// Plans the ranges for a package.
    ///
    /// `cutoffs` must be strictly increasing; callers are expected to have sorted and deduplicated
    /// the discovered `tsX.Y` directories.
    pub fn plan(
        &self,
        mode: PlanMode,
        minimum: Option<TsVersion>,
        cutoffs: &[TsVersion],
    ) -> Result<Vec<ValidationRange>, PlanError> {
        let single = match mode {
            PlanMode::AllVersions => return self.plan_cutoffs(minimum, cutoffs),
            PlanMode::OnlyLatest => TsTarget::Version(self.catalogue.latest()),
            PlanMode::Local => TsTarget::Local,
        };
        Ok(vec![ValidationRange {
            low: single,
            high: single,
            is_latest: true,
            directory: None,
        }])
    }

    // Cutoffs [3.2, 3.5, 3.6] ship ts3.2, ts3.5 and ts3.6 for <=3.2, <=3.5 and <=3.6; the root
    // covers 3.7 and above. That yields [lowest-3.2, 3.3-3.5, 3.6-3.6, 3.7-latest].
    fn plan_cutoffs(
        &self,
        minimum: Option<TsVersion>,
        cutoffs: &[TsVersion],
    ) -> Result<Vec<ValidationRange>, PlanError> {
        let min = self.effective_minimum(minimum);

        let mut lows = Vec::with_capacity(cutoffs.len() + 1);
        lows.push(self.catalogue.lowest());
        for &c in cutoffs {
            lows.push(self.next_version(c)?);
        }

        let mut ranges = Vec::with_capacity(lows.len());
        for (i, low) in lows.into_iter().enumerate() {
            let low = low.max(min);
            let (high, directory) = match cutoffs.get(i) {
                Some(&c) => (c, Some(c.directory_name())),
                None => (self.catalogue.latest(), None),
            };

            if high < low {
                return Err(PlanError::MinimumAboveDirectory {
                    minimum: min,
                    directory: directory.unwrap_or_else(|| "root".to_string()),
                });
            }

            let range = ValidationRange {
                low: low.into(),
                high: high.into(),
                is_latest: directory.is_none(),
                directory,
            };
            debug!(
                low = %range.low,
                high = %range.high,
                directory = range.directory_label(),
                "planned range"
            );
            ranges.push(range);
        }

        Ok(ranges)
    }

    fn next_version(&self, v: TsVersion) -> Result<TsVersion, PlanError> {
        if !self.catalogue.contains(v) {
            return Err(PlanError::UnknownVersion { version: v });
        }
        self.catalogue
            .next_after(v)
            .ok_or(PlanError::NoNextVersion { version: v })
    }
}

/// Plans every range for a package against all catalogue versions.
pub fn plan_ranges(
    catalogue: &VersionCatalogue,
    minimum: Option<TsVersion>,
    cutoffs: &[TsVersion],
) -> Result<Vec<ValidationRange>, PlanError> {
    RangePlanner::new(catalogue).plan(PlanMode::AllVersions, minimum, cutoffs)
}
