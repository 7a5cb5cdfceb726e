//! End-to-end runs under a real shell: steps resume from their stamps.

#![cfg(unix)]

use std::fs;

use extmgr_lib::package::{ConfiguredPackage, StampMap};
use extmgr_lib::execute::ShellRunner;
use extmgr_lib::{BuildError, BuildState, Package};
use tempfile::TempDir;

use super::common::{FLAG, Toy, config, install_dir, orchestrator};

fn runner() -> ShellRunner {
  ShellRunner::new().with_shell("sh").capturing(true)
}

fn log_lines(temp: &TempDir, name: &str) -> Vec<String> {
  fs::read_to_string(install_dir(temp, name).join("log"))
    .unwrap_or_default()
    .lines()
    .map(str::to_string)
    .collect()
}

#[tokio::test]
async fn steps_run_once_in_order() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());
  let mut orch = orchestrator(runner(), vec![Toy::new("solo")], &[]);

  orch.make_distribution("dist", &config).await.unwrap();
  orch.make_distribution("dist", &config).await.unwrap();

  assert_eq!(log_lines(&temp, "solo"), vec!["fetch", "config", "build"]);
}

#[tokio::test]
async fn dependents_see_dependency_environment() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());

  let mut app = Toy::new("app");
  app.extra = vec![format!(
    "echo \"$LIB_ROOT\" > {}",
    install_dir(&temp, "app").join("lib_root").display()
  )];
  let mut orch = orchestrator(runner(), vec![app, Toy::new("lib")], &[("app", &["lib"])]);

  orch.make_distribution("dist", &config).await.unwrap();

  let seen = fs::read_to_string(install_dir(&temp, "app").join("lib_root")).unwrap();
  assert_eq!(seen.trim(), install_dir(&temp, "lib").display().to_string());
}

#[tokio::test]
async fn failing_step_keeps_its_script_and_resumes() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());
  let flag_file = temp.path().join("allow");

  let mut toy = Toy::new("flaky");
  toy.extra = vec![format!("test -e {}", flag_file.display())];
  let mut orch = orchestrator(runner(), vec![toy], &[]);

  let err = orch.make_distribution("dist", &config).await.unwrap_err();
  assert!(matches!(err, BuildError::StepFailed { ref step, .. } if step == "build"));
  assert_eq!(
    orch.state(),
    &BuildState::Failed {
      package: Some("flaky-1.0".to_string())
    }
  );

  let script = temp
    .path()
    .join("build/flaky/1.0")
    .join(FLAG)
    .join(format!("tmp-{}.sh", FLAG));
  assert!(fs::read_to_string(&script).unwrap().contains("test -e"));

  fs::write(&flag_file, "").unwrap();
  orch.make_distribution("dist", &config).await.unwrap();

  // "build" ran twice (failed, then succeeded); nothing before it reran.
  assert_eq!(log_lines(&temp, "flaky"), vec!["fetch", "config", "build", "build"]);
}

#[tokio::test]
async fn stale_step_reruns_with_its_successors() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());

  let mut toy = Toy::new("archive");
  toy.source = vec!["download", "extract"];
  toy.build = vec![];

  let package: &dyn Package = &toy;
  let configured = ConfiguredPackage::attach(package, &config).unwrap();
  fs::create_dir_all(&configured.dirs().version_dir).unwrap();
  let stamps: StampMap = [("download", 100), ("extract", 50)].into_iter().collect();
  stamps.save(&configured.stamp_path()).unwrap();

  let mut configured = ConfiguredPackage::attach(package, &config).unwrap();
  assert_eq!(configured.pending().source.as_deref(), Some("extract"));

  let report = configured.run(&[], &runner()).await.unwrap();

  assert_eq!(report.executed, vec!["extract".to_string()]);
  assert_eq!(log_lines(&temp, "archive"), vec!["extract"]);
}
