//! Script execution.
//!
//! Provides the narrow seam between the package state machine and the
//! operating system: a script goes in, an exit status and captured output
//! come out.

pub mod runner;
pub mod types;

pub use runner::{ScriptRunner, ShellRunner};
pub use types::{ExecuteError, ScriptOutput, ScriptRequest, ScriptStatus};

/// Line prepended to every generated script so the first failing command
/// aborts it.
pub const FAIL_FAST: &str = "set -e";

/// Join commands into one fail-fast script body.
pub fn script_body<'a>(cmds: impl IntoIterator<Item = &'a String>) -> String {
  let mut body = String::from(FAIL_FAST);
  body.push('\n');
  for cmd in cmds {
    body.push_str(cmd);
    body.push('\n');
  }
  body
}
