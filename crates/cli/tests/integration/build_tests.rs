//! `extmgr build` against prepared install trees.

use predicates::prelude::*;

use super::common::{FLAG, TestEnv};

#[test]
fn corrupt_stamp_file_is_fatal() {
  let env = TestEnv::new();
  env.write_stamps("fmt", "11.0.2", "{ not json");

  env
    .cmd("build", "releaseA")
    .arg("--dry-run")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to parse stamp file"))
    .stderr(predicate::str::contains("step_stamp.json"));
}

#[test]
fn up_to_date_distribution_runs_nothing() {
  let env = TestEnv::new();
  let stamps = format!(r#"{{"clone": 10, "{0}-config": 20, "{0}-build": 30}}"#, FLAG);
  env.write_stamps("fmt", "11.0.2", &stamps);
  env.write_stamps("Catch2", "v3.7.1", &stamps);

  env
    .cmd("build", "releaseA")
    .assert()
    .success()
    .stdout(predicate::str::contains("releaseA is up to date"))
    .stdout(predicate::str::contains("Steps executed: 0"));

  let scripts = env.prefix().join("setup-scripts/releaseA").join(FLAG);
  let sh = std::fs::read_to_string(scripts.join(format!("{}.sh", FLAG))).unwrap();
  assert!(sh.starts_with("# fmt - 11.0.2\n"));
  assert!(sh.contains("# Catch2 - v3.7.1"));
  assert!(scripts.join(format!("{}.csh", FLAG)).exists());
}

#[test]
fn dry_run_only_plans_pending_steps() {
  let env = TestEnv::new();
  let stamps = format!(r#"{{"clone": 10, "{0}-config": 20, "{0}-build": 30}}"#, FLAG);
  env.write_stamps("fmt", "11.0.2", &stamps);

  env
    .cmd("build", "releaseA")
    .arg("--dry-run")
    .assert()
    .success()
    .stdout(predicate::str::contains("3 step(s) would run"))
    .stderr(predicate::str::contains("git clone https://github.com/catchorg/Catch2.git"))
    .stderr(predicate::str::contains("git clone https://github.com/fmtlib/fmt.git").not());
}
