//! Embeddable core library for dtslint.
//!
//! Provides a clap-free entry point that validates one DefinitelyTyped package, suitable for the
//! `dtslint` binary and for hosts that drive many packages (listen mode, CI runners).
//!
//! # Port traits
//!
//! External tools are reached through the port traits in [`ports`]:
//! - [`TypeChecker`](ports::TypeChecker) runs one compiler version against one directory
//! - [`CompatChecker`](ports::CompatChecker) runs the published-artifact compatibility check
//! - [`ExpectedFailureSource`](ports::ExpectedFailureSource) loads the known-failing allow-list
//!
//! The [`adapters`] module provides process- and file-backed implementations plus in-memory
//! ones for embedding and testing.
//!
//! # Entry points
//!
//! - [`plan_package`](pipeline::plan_package) checks conventions and plans ranges without running anything
//! - [`run_package`](pipeline::run_package) runs the whole validation and returns a report

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod render;
pub mod settings;

// Re-exported so embedders don't need dtslint-domain directly.
pub use dtslint_domain::{PlanMode, VersionCatalogue};
