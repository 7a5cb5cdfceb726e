//! Generated setup commands are valid shell.

#![cfg(unix)]

use std::process::Command;

use extmgr_lib::ShellDialect;
use extmgr_lib::execute::script_body;

fn run_sh(script: &str) -> String {
  let output = Command::new("sh").arg("-c").arg(script).env_remove("EXTMGR_TEST_PATH").output().unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn unset_variable_gets_value_alone() {
  let mut cmds = ShellDialect::Sh.append_envvar(&[("EXTMGR_TEST_PATH", "/a")]);
  cmds.push("echo \"$EXTMGR_TEST_PATH\"".to_string());

  assert_eq!(run_sh(&script_body(&cmds)), "/a");
}

#[test]
fn repeated_appends_prepend() {
  let mut cmds = ShellDialect::Sh.append_envvar(&[("EXTMGR_TEST_PATH", "/a"), ("EXTMGR_TEST_PATH", "/b")]);
  cmds.push("echo \"$EXTMGR_TEST_PATH\"".to_string());

  assert_eq!(run_sh(&script_body(&cmds)), "/b:/a");
}
