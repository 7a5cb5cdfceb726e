//! Step completion stamps.
//!
//! One JSON object per (name, version) location maps step names to the time
//! the step last completed, in nanoseconds since the Unix epoch:
//!
//! ```text
//! {
//!   "download": 1718000000000000000,
//!   "x86_64-el9-gcc13-opt-config": 1718000100000000000
//! }
//! ```
//!
//! The file is rewritten in full after every completed step, through a
//! temporary file and a rename so a crash never leaves it half written.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos() as u64)
    .unwrap_or_default()
}

/// Step name to completion time. Missing steps read as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampMap {
  stamps: BTreeMap<String, u64>,
}

impl StampMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load the stamp file at `path`.
  ///
  /// A missing file is an empty map. A file that exists but cannot be read
  /// or parsed is an error: discarding it would silently redo finished work.
  pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
      Err(source) => {
        return Err(ConfigurationError::StampRead {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    serde_json::from_str(&content).map_err(|source| ConfigurationError::StampParse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Write the full map to `path`.
  pub fn save(&self, path: &Path) -> io::Result<()> {
    let content = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
  }

  pub fn get(&self, step: &str) -> u64 {
    self.stamps.get(step).copied().unwrap_or(0)
  }

  /// Record a completion of `step` at `at`.
  ///
  /// The stored value is at least one more than any stamp already in the
  /// map, so a wall clock stepping backwards cannot make a fresh completion
  /// look older than earlier ones. Returns the stored value.
  pub fn record(&mut self, step: &str, at: u64) -> u64 {
    let floor = self.stamps.values().max().map_or(0, |max| max + 1);
    let stamp = at.max(floor).max(1);
    self.stamps.insert(step.to_string(), stamp);
    stamp
  }

  /// Record a completion of `step` now.
  pub fn touch(&mut self, step: &str) -> u64 {
    self.record(step, now_nanos())
  }

  pub fn len(&self) -> usize {
    self.stamps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stamps.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
    self.stamps.iter().map(|(k, v)| (k.as_str(), *v))
  }
}

impl<K: Into<String>> FromIterator<(K, u64)> for StampMap {
  fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
    Self {
      stamps: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
    }
  }
}
