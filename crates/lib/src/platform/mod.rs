//! Host detection and build flags.
//!
//! A build flag names one configuration of the host:
//! `<arch>-<os alias><os major>-<compiler><major>-<build type alias>`, for
//! example `x86_64-el9-gcc13-opt`. Build directories, install directories
//! and build-step stamps are all scoped by it.

pub mod arch;
pub mod compiler;
pub mod os;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::BuildType;

use arch::Arch;
use compiler::Compiler;
use os::OsRelease;

/// Why the host could not be identified.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("unsupported architecture: {0}")]
  UnsupportedArch(String),

  #[error("failed to read {path}: {source}")]
  OsRelease {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("os-release has no {0} field")]
  MissingOsField(&'static str),

  #[error("failed to run {compiler}: {source}")]
  CompilerSpawn {
    compiler: String,
    #[source]
    source: io::Error,
  },

  #[error("cannot parse compiler version {0:?}")]
  CompilerVersion(String),
}

/// The parts of a build flag that come from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
  pub arch: Arch,
  pub os: OsRelease,
  pub compiler: Compiler,
}

impl Platform {
  pub fn new(arch: Arch, os: OsRelease, compiler: Compiler) -> Self {
    Self { arch, os, compiler }
  }

  /// Detect the current host: architecture, `/etc/os-release` and gcc.
  pub fn detect() -> Result<Self, PlatformError> {
    Self::detect_with(Path::new(OsRelease::PATH))
  }

  /// Like [`Self::detect`], reading the os-release file at `os_release`.
  pub fn detect_with(os_release: &Path) -> Result<Self, PlatformError> {
    let arch = Arch::current().ok_or_else(|| PlatformError::UnsupportedArch(std::env::consts::ARCH.to_string()))?;
    let os = OsRelease::load(os_release)?;
    let compiler = Compiler::detect_gcc()?;

    let platform = Self::new(arch, os, compiler);
    debug!(platform = %platform, "detected platform");
    Ok(platform)
  }

  /// Host part of the flag, e.g. `x86_64-el9-gcc13`.
  pub fn triple(&self) -> String {
    format!("{}-{}-{}", self.arch, self.os.alias(), self.compiler.tag())
  }

  /// Full build flag for `build_type`.
  pub fn build_flag(&self, build_type: BuildType) -> String {
    format!("{}-{}", self.triple(), build_type.alias())
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// Build flag of the current host for `build_type`.
pub fn detect_build_flag(build_type: BuildType) -> Result<String, PlatformError> {
  Ok(Platform::detect()?.build_flag(build_type))
}
