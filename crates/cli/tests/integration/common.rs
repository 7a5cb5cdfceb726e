//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const FLAG: &str = "x86_64-el9-gcc13-opt";

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the install prefix
/// and the build tree.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Install prefix (isolated per test).
  pub fn prefix(&self) -> PathBuf {
    let p = self.temp.path().join("ext");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn build_dir(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  /// Write the stamp file of `name`/`version` under the prefix.
  pub fn write_stamps(&self, name: &str, version: &str, content: &str) -> PathBuf {
    let dir = self.prefix().join(name).join(version);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("step_stamp.json");
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Command for `extmgr <subcommand>` configured for this environment
  /// through the `EXTMGR_*` variables.
  pub fn cmd(&self, subcommand: &str, distribution: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("extmgr");
    cmd
      .arg(subcommand)
      .args(["-d", distribution, "--build-flag", FLAG])
      .env("EXTMGR_PREFIX", self.prefix())
      .env("EXTMGR_BUILD_DIR", self.build_dir())
      .env("EXTMGR_PATCH_DIR", self.temp.path().join("patches"))
      .env("NO_COLOR", "1");
    cmd
  }
}
