//! Packages: one (name, version) unit of external software.
//!
//! A [`Package`] is a recipe. It names itself and produces two ordered step
//! groups plus the shell commands that make the installed result usable.
//! Attaching a [`BuildConfig`](crate::config::BuildConfig) turns a recipe
//! into a [`ConfiguredPackage`], which owns the completion stamps and runs
//! whatever steps are pending.

pub mod configured;
pub mod context;
pub mod resume;
pub mod stamp;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::shell::ShellDialect;

pub use configured::{ConfiguredPackage, PendingSteps, RunReport};
pub use context::{PackageContext, PackageDirs};
pub use resume::next_step_index;
pub use stamp::StampMap;

/// Ordered shell commands.
pub type CmdList = Vec<String>;

/// Setup commands per shell dialect.
pub type SetupCommands = BTreeMap<ShellDialect, CmdList>;

/// One named phase of a package pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
  pub name: String,
  pub cmds: CmdList,
}

impl Step {
  pub fn new(name: impl Into<String>, cmds: CmdList) -> Self {
    Self {
      name: name.into(),
      cmds,
    }
  }
}

/// Where a package's build and install trees live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
  /// One build and install tree per build flag.
  #[default]
  PerBuildFlag,
  /// A single build and install tree shared by every configuration.
  Shared,
}

/// A package recipe.
///
/// Step producers must be pure: they only read the recipe and the context,
/// and may be called any number of times before or after execution.
pub trait Package: Send + Sync {
  fn name(&self) -> &str;

  fn version(&self) -> &str;

  fn layout(&self) -> Layout {
    Layout::PerBuildFlag
  }

  /// Patch files, relative to the patch directory, the recipe applies.
  ///
  /// Each must exist when a configuration is attached.
  fn required_patches(&self) -> Vec<PathBuf> {
    Vec::new()
  }

  /// Steps that prepare the source tree (fetch, extract, patch).
  ///
  /// Stamped under their plain names, so they are shared by every build flag.
  fn prepare_source_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step>;

  /// Steps that configure, build and install.
  ///
  /// Stamped as `<build_flag>-<name>`. Shared-layout packages leave this
  /// empty and do all their work while preparing the source.
  fn build_steps(&self, _ctx: &PackageContext<'_>) -> Vec<Step> {
    Vec::new()
  }

  /// Commands that put the installed package on the search paths.
  fn setup_cmds(&self, ctx: &PackageContext<'_>) -> SetupCommands;

  /// `<name>-<version>`, used in logs and errors.
  fn id(&self) -> String {
    format!("{}-{}", self.name(), self.version())
  }
}

/// Setup commands for every dialect, prepending each value to its variable.
pub fn env_setup<K, V>(pairs: &[(K, V)]) -> SetupCommands
where
  K: AsRef<str>,
  V: AsRef<str>,
{
  ShellDialect::ALL
    .into_iter()
    .map(|dialect| (dialect, dialect.append_envvar(pairs)))
    .collect()
}

impl std::fmt::Debug for dyn Package {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Package({} {})", self.name(), self.version())
  }
}
