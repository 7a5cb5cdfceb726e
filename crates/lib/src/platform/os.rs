//! Distribution identification from `/etc/os-release`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::PlatformError;

/// Release families that share binaries and are all reported as `el`.
const EL_FAMILY: &[&str] = &["almalinux", "rhel", "rocky", "centos"];

/// The `ID` and `VERSION_ID` of an os-release file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsRelease {
  pub id: String,
  pub version_id: String,
}

impl OsRelease {
  pub const PATH: &'static str = "/etc/os-release";

  /// Read and parse the os-release file at `path`.
  pub fn load(path: &Path) -> Result<Self, PlatformError> {
    let content = std::fs::read_to_string(path).map_err(|source| PlatformError::OsRelease {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content)
  }

  /// Parse `KEY=value` lines. Values may be double or single quoted;
  /// blank lines and comments are skipped.
  pub fn parse(content: &str) -> Result<Self, PlatformError> {
    let fields: HashMap<&str, &str> = content
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty() && !line.starts_with('#'))
      .filter_map(|line| line.split_once('='))
      .map(|(key, value)| (key.trim(), value.trim().trim_matches(|c| c == '"' || c == '\'')))
      .collect();

    let field = |key: &'static str| {
      fields
        .get(key)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or(PlatformError::MissingOsField(key))
    };

    Ok(Self {
      id: field("ID")?,
      version_id: field("VERSION_ID")?,
    })
  }

  /// Major component of `VERSION_ID`.
  pub fn major_version(&self) -> &str {
    self.version_id.split('.').next().unwrap_or(&self.version_id)
  }

  /// `ID` with EL rebuilds folded into `el`.
  pub fn family(&self) -> &str {
    if EL_FAMILY.contains(&self.id.as_str()) {
      "el"
    } else {
      &self.id
    }
  }

  /// Family and major version, e.g. `el9` or `ubuntu24`.
  pub fn alias(&self) -> String {
    format!("{}{}", self.family(), self.major_version())
  }
}

impl fmt::Display for OsRelease {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.alias())
  }
}
