//! `extmgr status` reporting.

use predicates::prelude::*;

use super::common::{FLAG, TestEnv};

#[test]
fn partially_built_distribution() {
  let env = TestEnv::new();
  env.write_stamps("Catch2", "v3.5.4", &format!(r#"{{"clone": 10, "{}-config": 20}}"#, FLAG));

  env
    .cmd("status", "releaseB")
    .assert()
    .success()
    .stdout(predicate::str::contains("2 of 2 package(s) pending"))
    .stdout(predicate::str::contains("Catch2 v3.5.4  source ✓  build → build"))
    .stdout(predicate::str::contains("fmt 10.2.1  source → clone  build → config"));
}

#[test]
fn stale_source_step_is_reported() {
  let env = TestEnv::new();
  env.write_stamps("CLHEP", "2.4.7.1", r#"{"download": 100, "extract": 50}"#);

  env
    .cmd("status", "hep-base")
    .assert()
    .success()
    .stdout(predicate::str::contains("CLHEP 2.4.7.1  source → extract"));
}

#[test]
fn status_never_creates_directories() {
  let env = TestEnv::new();

  env.cmd("status", "releaseA").assert().success();

  assert!(!env.build_dir().exists());
  assert_eq!(std::fs::read_dir(env.prefix()).unwrap().count(), 0);
}
