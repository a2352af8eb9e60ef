use crate::version::TsTarget;
use serde::{Deserialize, Serialize};

/// One inclusive span of compiler versions that must type-check a single directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRange {
    pub low: TsTarget,
    pub high: TsTarget,

    /// True for the unbounded upper range, which is validated at the package root.
    pub is_latest: bool,

    /// Override directory (`tsX.Y`) relative to the package root; `None` means the root itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl ValidationRange {
    /// Human label for the directory this range validates.
    pub fn directory_label(&self) -> &str {
        self.directory.as_deref().unwrap_or("root")
    }
}
