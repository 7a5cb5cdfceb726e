//! Build configuration shared by every package of one invocation.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CMake build type a configuration targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
  #[default]
  Release,
  Debug,
  RelWithDebInfo,
}

impl BuildType {
  /// Returns the value passed to `CMAKE_BUILD_TYPE`.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Release => "Release",
      Self::Debug => "Debug",
      Self::RelWithDebInfo => "RelWithDebInfo",
    }
  }

  /// Returns the short alias used as the last component of a build flag.
  pub fn alias(&self) -> &'static str {
    match self {
      Self::Release => "opt",
      Self::Debug => "dbg",
      Self::RelWithDebInfo => "rwd",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Release" | "opt" => Ok(Self::Release),
      "Debug" | "dbg" => Ok(Self::Debug),
      "RelWithDebInfo" | "rwd" => Ok(Self::RelWithDebInfo),
      other => Err(format!("unknown build type: {}", other)),
    }
  }
}

/// Paths and switches for one invocation.
///
/// Created once, then only borrowed. Packages derive all their directories
/// from the roots held here and from `build_flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
  /// Directory holding patch files referenced by recipes.
  pub patch_dir: PathBuf,

  /// Root of the per-package build trees.
  pub build_root: PathBuf,

  /// Root of the install tree (sources, installs, stamps, setup scripts).
  pub install_root: PathBuf,

  pub build_type: BuildType,

  /// Platform identifier, e.g. `x86_64-el9-gcc13-opt`.
  pub build_flag: String,

  /// Number of parallel jobs handed to the native build tool.
  pub job_count: usize,

  /// Only report what would run.
  pub dry_run: bool,
}

impl BuildConfig {
  /// Create a configuration with one job and dry-run disabled.
  pub fn new(
    patch_dir: impl Into<PathBuf>,
    build_root: impl Into<PathBuf>,
    install_root: impl Into<PathBuf>,
    build_type: BuildType,
    build_flag: impl Into<String>,
  ) -> Self {
    Self {
      patch_dir: patch_dir.into(),
      build_root: build_root.into(),
      install_root: install_root.into(),
      build_type,
      build_flag: build_flag.into(),
      job_count: 1,
      dry_run: false,
    }
  }

  pub fn with_jobs(mut self, job_count: NonZeroUsize) -> Self {
    self.job_count = job_count.get();
    self
  }

  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Directory receiving the combined setup scripts of a distribution.
  pub fn setup_script_dir(&self, distribution: &str) -> PathBuf {
    self
      .install_root
      .join("setup-scripts")
      .join(distribution)
      .join(&self.build_flag)
  }

  pub fn patch_path(&self, file: impl AsRef<Path>) -> PathBuf {
    self.patch_dir.join(file)
  }
}

impl fmt::Display for BuildConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.build_flag)
  }
}
