//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::execute::ExecuteError;

/// Problems with the inputs of a build, detected before any command runs.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("failed to read stamp file {path}: {source}")]
  StampRead {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse stamp file {path}: {source}; check it or remove it")]
  StampParse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("distribution {0} not found, did you forget to register it?")]
  UnknownDistribution(String),

  #[error("package {package}: patch file not found: {path}")]
  MissingPatch { package: String, path: PathBuf },
}

/// Invalid package or distribution registrations.
#[derive(Debug, Error)]
pub enum GraphError {
  #[error("package {name} {version} already exists")]
  DuplicatePackage { name: String, version: String },

  #[error("distribution {0} already exists")]
  DuplicateDistribution(String),

  #[error("package {name} {version} not found")]
  UnknownPackage { name: String, version: String },

  #[error("package {package} selected more than once in distribution {distribution}")]
  DuplicateMember { distribution: String, package: String },

  #[error("package {package} has dependencies in distribution {distribution} but is not one of its members")]
  NotAMember { distribution: String, package: String },

  #[error(
    "dependency {dependency} of {package} not found in distribution {distribution}; \
     dependencies must be members of the distribution"
  )]
  DanglingDependency {
    distribution: String,
    package: String,
    dependency: String,
  },

  #[error("dependency cycle detected in distribution {distribution} among: {}", .remaining.join(", "))]
  Cycle {
    distribution: String,
    remaining: Vec<String>,
  },
}

/// Failures while building a package or a distribution.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("package {package}: step {step} failed with exit code {code:?}")]
  StepFailed {
    package: String,
    step: String,
    code: Option<i32>,
  },

  #[error("package {package}: interrupted during step {step}")]
  Interrupted { package: String, step: String },

  #[error("distribution {distribution}: interrupted before writing setup scripts")]
  InterruptedBeforeSetupScripts { distribution: String },

  #[error("package {package}: environment setup commands failed with exit code {code:?}")]
  SetupCheckFailed { package: String, code: Option<i32> },

  #[error("{context} {path}: {source}")]
  Io {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("package {package}: {source}")]
  Execute {
    package: String,
    #[source]
    source: ExecuteError,
  },
}

impl BuildError {
  /// True when the build stopped because the operator cancelled it.
  pub fn is_interrupted(&self) -> bool {
    matches!(self, Self::Interrupted { .. } | Self::InterruptedBeforeSetupScripts { .. })
  }

  /// Name of the package the error is attributed to, if any.
  pub fn package(&self) -> Option<&str> {
    match self {
      Self::StepFailed { package, .. }
      | Self::Interrupted { package, .. }
      | Self::SetupCheckFailed { package, .. }
      | Self::Execute { package, .. } => Some(package),
      Self::Configuration(ConfigurationError::MissingPatch { package, .. }) => Some(package),
      _ => None,
    }
  }
}
