//! Script runners.
//!
//! Every step of every package ends up as one shell script. Runners write
//! that script to disk, execute it and report how it finished. The state
//! machine only talks to [`ScriptRunner`], so tests can swap in a recording
//! runner without spawning processes.

use std::future::Future;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, OnceLock};

use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::types::{ExecuteError, ScriptOutput, ScriptRequest, ScriptStatus};

/// Execute a script, return its exit status, capture its output.
pub trait ScriptRunner {
  fn run(&self, request: ScriptRequest<'_>) -> impl Future<Output = Result<ScriptOutput, ExecuteError>>;

  /// True once the operator asked to stop, even between scripts.
  fn interrupted(&self) -> bool {
    false
  }
}

/// Runs scripts with a real shell.
///
/// The script is written to `request.script_path` and executed as
/// `<shell> <script_path>` from `request.work_dir`.
///
/// The first run installs a SIGINT listener that lives as long as the
/// runner. An interrupt is latched: the running child is killed, and every
/// later script is reported as [`ScriptStatus::Interrupted`] without being
/// spawned. A child that dies from SIGINT (or exits 130) counts as
/// interrupted too, since a terminal Ctrl-C reaches the whole process group.
#[derive(Debug, Clone)]
pub struct ShellRunner {
  shell: String,
  capture: bool,
  interrupts: Arc<OnceLock<watch::Receiver<bool>>>,
}

impl Default for ShellRunner {
  fn default() -> Self {
    Self {
      shell: "bash".to_string(),
      capture: false,
      interrupts: Arc::default(),
    }
  }
}

impl ShellRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Use a different interpreter than `bash`.
  pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
    self.shell = shell.into();
    self
  }

  /// Capture stdout/stderr instead of streaming them to the terminal.
  pub fn capturing(mut self, capture: bool) -> Self {
    self.capture = capture;
    self
  }

  pub fn shell(&self) -> &str {
    &self.shell
  }

  fn interrupt_receiver(&self) -> Result<watch::Receiver<bool>, ExecuteError> {
    if let Some(rx) = self.interrupts.get() {
      return Ok(rx.clone());
    }
    let rx = listen_for_interrupts()?;
    Ok(self.interrupts.get_or_init(|| rx).clone())
  }
}

impl ScriptRunner for ShellRunner {
  async fn run(&self, request: ScriptRequest<'_>) -> Result<ScriptOutput, ExecuteError> {
    let mut interrupts = self.interrupt_receiver()?;
    if *interrupts.borrow() {
      warn!(label = %request.label, "interrupted by user, not starting script");
      return Ok(ScriptOutput::with_status(ScriptStatus::Interrupted));
    }

    write_script(request.script_path, request.body).await?;

    info!(label = %request.label, script = %request.script_path.display(), "running script");

    let mut command = Command::new(&self.shell);
    command
      .arg(request.script_path)
      .current_dir(request.work_dir)
      .stdin(Stdio::null())
      .kill_on_drop(true);

    if !self.capture {
      command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    debug!(shell = %self.shell, work_dir = ?request.work_dir, "spawning process");

    // Dropping the pending output future drops the child, which kills it.
    let output = tokio::select! {
      biased;
      Ok(_) = interrupts.wait_for(|interrupted| *interrupted) => {
        warn!(label = %request.label, "interrupted by user");
        return Ok(ScriptOutput::with_status(ScriptStatus::Interrupted));
      }
      output = command.output() => output.map_err(|source| ExecuteError::Spawn {
        shell: self.shell.clone(),
        source,
      })?,
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let status = match exit_status(output.status) {
      ScriptStatus::Failed(_) if *interrupts.borrow() => ScriptStatus::Interrupted,
      status => status,
    };

    match status {
      ScriptStatus::Failed(_) => {
        if !stderr.is_empty() {
          debug!(stderr = %stderr, "script stderr");
        }
        if !stdout.is_empty() {
          debug!(stdout = %stdout, "script stdout");
        }
      }
      ScriptStatus::Interrupted => warn!(label = %request.label, "interrupted by user"),
      ScriptStatus::Success => {}
    }

    Ok(ScriptOutput { status, stdout, stderr })
  }

  fn interrupted(&self) -> bool {
    self.interrupts.get().is_some_and(|rx| *rx.borrow())
  }
}

const SIGINT: i32 = 2;

fn exit_status(status: ExitStatus) -> ScriptStatus {
  if status.success() {
    return ScriptStatus::Success;
  }

  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    if status.signal() == Some(SIGINT) {
      return ScriptStatus::Interrupted;
    }
  }

  match status.code() {
    Some(code) if code == 128 + SIGINT => ScriptStatus::Interrupted,
    code => ScriptStatus::Failed(code),
  }
}

/// Latch SIGINT into a watch channel for the rest of the process.
fn listen_for_interrupts() -> Result<watch::Receiver<bool>, ExecuteError> {
  let (tx, rx) = watch::channel(false);

  #[cfg(unix)]
  {
    use tokio::signal::unix::{SignalKind, signal};
    let mut stream = signal(SignalKind::interrupt()).map_err(|source| ExecuteError::Signal { source })?;
    tokio::spawn(async move {
      while stream.recv().await.is_some() {
        if tx.send(true).is_err() {
          break;
        }
      }
    });
  }

  #[cfg(not(unix))]
  tokio::spawn(async move {
    while tokio::signal::ctrl_c().await.is_ok() {
      if tx.send(true).is_err() {
        break;
      }
    }
  });

  debug!("listening for interrupts");
  Ok(rx)
}

async fn write_script(path: &Path, body: &str) -> Result<(), ExecuteError> {
  let to_err = |source| ExecuteError::WriteScript {
    path: path.display().to_string(),
    source,
  };

  tokio::fs::write(path, body).await.map_err(to_err)?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
      .await
      .map_err(to_err)?;
  }

  Ok(())
}
