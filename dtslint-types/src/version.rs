use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A TypeScript compiler version at `major.minor` granularity.
///
/// Ordering is numeric per component, so `3.10` sorts after `3.2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TsVersion {
    major: u16,
    minor: u16,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("'{input}' is not a TypeScript version (expected <major>.<minor>)")]
    Malformed { input: String },
}

impl TsVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn major(self) -> u16 {
        self.major
    }

    pub fn minor(self) -> u16 {
        self.minor
    }

    /// Name of the override directory holding declarations valid up to this version.
    pub fn directory_name(self) -> String {
        format!("ts{}", self)
    }

    /// Parses a `tsX.Y` directory name.
    ///
    /// Returns `None` when the name has no `ts` prefix at all, and `Some(Err(_))` when it does but
    /// the remainder is not a version.
    pub fn from_directory_name(name: &str) -> Option<Result<Self, VersionParseError>> {
        name.strip_prefix("ts").map(str::parse)
    }
}

impl fmt::Display for TsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for TsVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || VersionParseError::Malformed {
            input: s.to_string(),
        };
        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(major) || !digits(minor) {
            return Err(malformed());
        }
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }
}

impl TryFrom<String> for TsVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TsVersion> for String {
    fn from(v: TsVersion) -> Self {
        v.to_string()
    }
}

/// Bound of a validation range: a catalogue version, or an ad-hoc local compiler build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TsTarget {
    Version(TsVersion),
    Local,
}

impl TsTarget {
    pub const LOCAL: &'static str = "local";

    pub fn version(self) -> Option<TsVersion> {
        match self {
            TsTarget::Version(v) => Some(v),
            TsTarget::Local => None,
        }
    }
}

impl From<TsVersion> for TsTarget {
    fn from(v: TsVersion) -> Self {
        TsTarget::Version(v)
    }
}

impl fmt::Display for TsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsTarget::Version(v) => v.fmt(f),
            TsTarget::Local => f.write_str(Self::LOCAL),
        }
    }
}

impl FromStr for TsTarget {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::LOCAL {
            Ok(TsTarget::Local)
        } else {
            s.parse().map(TsTarget::Version)
        }
    }
}

impl TryFrom<String> for TsTarget {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TsTarget> for String {
    fn from(t: TsTarget) -> Self {
        t.to_string()
    }
}
