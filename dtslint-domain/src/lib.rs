//! Domain logic: turn package metadata into a validation plan, and check outcomes into verdicts.
//!
//! This crate owns *which* compiler versions must validate a package and *whether* an outcome is
//! acceptable. It does not install compilers or run them; that's the `dtslint-core` crate.

mod catalogue;
pub mod checks;
mod metadata;
mod planner;
mod ports;
mod reconcile;

pub use catalogue::{CatalogueError, DEFAULT_SUPPORTED, VersionCatalogue};
pub use checks::{ConventionError, OlderVersion, PackageLocation, check_conventions, check_layout};
pub use metadata::{PackageMetadata, read_metadata};
pub use planner::{PlanError, PlanMode, RangePlanner, plan_ranges};
pub use ports::{FsPackageView, PackageView};
pub use reconcile::{EXPECTED_FAILURES_KEY, Rejection, reconcile};
