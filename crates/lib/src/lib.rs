//! extmgr-lib: building external software distributions from source.
//!
//! This crate provides the pieces the `extmgr` CLI is made of:
//! - `Package`: a recipe producing ordered source and build steps
//! - `ConfiguredPackage`: a recipe bound to a `BuildConfig`, resuming from
//!   persisted step stamps
//! - `Distribution`: a dependency-ordered selection of packages
//! - `Orchestrator`: builds distributions and writes their setup scripts

pub mod config;
pub mod distribution;
pub mod error;
pub mod execute;
pub mod orchestrator;
pub mod package;
pub mod platform;
pub mod recipes;
pub mod registry;
pub mod shell;
pub mod util;

pub use config::{BuildConfig, BuildType};
pub use distribution::Distribution;
pub use error::{BuildError, ConfigurationError, GraphError};
pub use orchestrator::{BuildState, DistributionReport, Orchestrator};
pub use package::{ConfiguredPackage, Layout, Package, PackageContext, Step};
pub use registry::Registry;
pub use shell::ShellDialect;
