//! Types for script execution.

use std::path::Path;

use thiserror::Error;

/// Errors raised by a runner itself, as opposed to a script exiting non-zero.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The script file could not be written.
  #[error("failed to write script {path}: {source}")]
  WriteScript {
    path: String,
    #[source]
    source: std::io::Error,
  },

  /// The interrupt listener could not be installed.
  #[error("failed to listen for interrupts: {source}")]
  Signal {
    #[source]
    source: std::io::Error,
  },

  /// The shell could not be started or waited on.
  #[error("failed to run {shell}: {source}")]
  Spawn {
    shell: String,
    #[source]
    source: std::io::Error,
  },
}

/// One script to execute.
#[derive(Debug, Clone, Copy)]
pub struct ScriptRequest<'a> {
  /// Label used in logs, e.g. `fmt-11.0.2/download`.
  pub label: &'a str,

  /// Full script text, fail-fast header included.
  pub body: &'a str,

  /// Where the script is written before running.
  pub script_path: &'a Path,

  /// Working directory of the shell.
  pub work_dir: &'a Path,
}

/// How a script finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
  Success,
  /// Exited non-zero; `None` when terminated by a signal.
  Failed(Option<i32>),
  /// Cancelled by the operator before it finished.
  Interrupted,
}

/// Exit status plus whatever output the runner captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
  pub status: ScriptStatus,
  pub stdout: String,
  pub stderr: String,
}

impl ScriptOutput {
  pub fn success() -> Self {
    Self::with_status(ScriptStatus::Success)
  }

  pub fn with_status(status: ScriptStatus) -> Self {
    Self {
      status,
      stdout: String::new(),
      stderr: String::new(),
    }
  }

  pub fn is_success(&self) -> bool {
    self.status == ScriptStatus::Success
  }
}
