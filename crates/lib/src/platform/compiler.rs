//! Compiler identification.

use std::process::Command;

use tracing::debug;

use super::PlatformError;

/// Compiler name and major version, e.g. `gcc13`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
  pub name: String,
  pub major: u32,
}

impl Compiler {
  /// Ask `gcc -dumpversion`.
  pub fn detect_gcc() -> Result<Self, PlatformError> {
    let output = Command::new("gcc")
      .arg("-dumpversion")
      .output()
      .map_err(|source| PlatformError::CompilerSpawn {
        compiler: "gcc".to_string(),
        source,
      })?;

    let version = String::from_utf8_lossy(&output.stdout);
    debug!(version = %version.trim(), "detected gcc");
    Self::from_version("gcc", &version)
  }

  /// Parse a dotted version string such as `13.2.1` or `13`.
  pub fn from_version(name: &str, version: &str) -> Result<Self, PlatformError> {
    let version = version.trim();
    let major = version
      .split('.')
      .next()
      .and_then(|major| major.parse().ok())
      .ok_or_else(|| PlatformError::CompilerVersion(version.to_string()))?;

    Ok(Self {
      name: name.to_string(),
      major,
    })
  }

  pub fn tag(&self) -> String {
    format!("{}{}", self.name, self.major)
  }
}
