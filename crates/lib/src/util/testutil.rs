//! Test utilities for extmgr-lib.
//!
//! [`RecordingRunner`] stands in for the shell: it remembers every script it
//! was asked to run and answers with a configurable status, so state machine
//! tests never spawn processes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::execute::{ExecuteError, ScriptOutput, ScriptRequest, ScriptRunner, ScriptStatus};

/// A script seen by a [`RecordingRunner`].
#[derive(Debug, Clone)]
pub struct RecordedScript {
  pub label: String,
  pub body: String,
  pub script_path: PathBuf,
  pub work_dir: PathBuf,
}

/// Records scripts instead of running them. Every script succeeds unless
/// its label was registered with [`RecordingRunner::fail_when`].
#[derive(Debug, Default)]
pub struct RecordingRunner {
  scripts: Mutex<Vec<RecordedScript>>,
  outcomes: HashMap<String, ScriptStatus>,
  interrupted: bool,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer `status` for the script labelled exactly `label`.
  pub fn fail_when(mut self, label: &str, status: ScriptStatus) -> Self {
    self.outcomes.insert(label.to_string(), status);
    self
  }

  /// Report a pending interrupt while still letting scripts succeed, as when
  /// Ctrl-C lands between two scripts.
  pub fn interrupt_pending(mut self) -> Self {
    self.interrupted = true;
    self
  }

  pub fn scripts(&self) -> Vec<RecordedScript> {
    self.scripts.lock().unwrap().clone()
  }

  pub fn labels(&self) -> Vec<String> {
    self.scripts().into_iter().map(|s| s.label).collect()
  }
}

impl ScriptRunner for RecordingRunner {
  async fn run(&self, request: ScriptRequest<'_>) -> Result<ScriptOutput, ExecuteError> {
    self.scripts.lock().unwrap().push(RecordedScript {
      label: request.label.to_string(),
      body: request.body.to_string(),
      script_path: request.script_path.to_path_buf(),
      work_dir: request.work_dir.to_path_buf(),
    });

    let status = self.outcomes.get(request.label).copied().unwrap_or(ScriptStatus::Success);
    Ok(ScriptOutput::with_status(status))
  }

  fn interrupted(&self) -> bool {
    self.interrupted
  }
}
