//! Distribution builds through the orchestrator.

use extmgr_lib::execute::ScriptStatus;
use extmgr_lib::{BuildError, BuildState, GraphError};
use tempfile::TempDir;

use super::common::{FLAG, RecordingRunner, Toy, build_label, config, orchestrator};

fn catch2_fmt(runner: RecordingRunner) -> extmgr_lib::Orchestrator<RecordingRunner> {
  orchestrator(runner, vec![Toy::new("fmt"), Toy::new("catch2")], &[("fmt", &["catch2"])])
}

#[tokio::test]
async fn dependency_builds_first_and_feeds_env_prefix() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());
  let mut orch = catch2_fmt(RecordingRunner::new());

  orch.make_distribution("dist", &config).await.unwrap();

  let labels = orch.runner().labels();
  let first_fmt = labels.iter().position(|l| l.starts_with("fmt")).unwrap();
  assert!(labels[..first_fmt].iter().all(|l| l.starts_with("catch2")));
  assert_eq!(labels[0], "catch2-1.0/fetch");

  let catch2_body = orch.runner().body(&build_label("catch2", "build")).unwrap();
  assert!(!catch2_body.contains("CATCH2_ROOT"));

  let fmt_body = orch.runner().body(&build_label("fmt", "build")).unwrap();
  assert!(fmt_body.starts_with("set -e\n"));
  assert!(fmt_body.contains(r#"if [ -z "$CATCH2_ROOT" ]; then"#));
  assert!(fmt_body.find("CATCH2_ROOT").unwrap() < fmt_body.find("echo build").unwrap());
  assert!(!fmt_body.contains("FMT_ROOT"));
}

#[tokio::test]
async fn immediate_rerun_executes_nothing() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());

  let mut first = catch2_fmt(RecordingRunner::new());
  first.make_distribution("dist", &config).await.unwrap();
  assert!(!first.runner().labels().is_empty());

  let mut second = catch2_fmt(RecordingRunner::new());
  let report = second.make_distribution("dist", &config).await.unwrap();

  assert!(report.is_up_to_date());
  assert!(second.runner().labels().is_empty());
  assert_eq!(second.state(), &BuildState::Succeeded);
}

#[tokio::test]
async fn failed_build_keeps_config_stamp() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());
  let stamp_path = temp.path().join("ext/catch2/1.0/step_stamp.json");
  let config_key = format!("{}-config", FLAG);

  let runner = RecordingRunner::new().fail_when(&build_label("catch2", "build"), ScriptStatus::Failed(Some(1)));
  let mut orch = catch2_fmt(runner);
  let err = orch.make_distribution("dist", &config).await.unwrap_err();

  match &err {
    BuildError::StepFailed { package, step, .. } => {
      assert_eq!(package, "catch2-1.0");
      assert_eq!(step, "build");
    }
    other => panic!("unexpected error: {other}"),
  }

  let stamps: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&stamp_path).unwrap()).unwrap();
  let config_stamp = stamps[&config_key].as_u64().unwrap();
  assert!(config_stamp > 0);
  assert!(stamps.get(format!("{}-build", FLAG)).is_none());

  // The retry starts at "build" and leaves the config stamp alone.
  let mut retry = catch2_fmt(RecordingRunner::new());
  retry.make_distribution("dist", &config).await.unwrap();
  assert_eq!(retry.runner().labels()[0], build_label("catch2", "build"));

  let stamps: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&stamp_path).unwrap()).unwrap();
  assert_eq!(stamps[&config_key].as_u64().unwrap(), config_stamp);
}

#[tokio::test]
async fn setup_scripts_follow_build_order() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path());
  let mut orch = catch2_fmt(RecordingRunner::new());

  let report = orch.make_distribution("dist", &config).await.unwrap();

  let dir = temp.path().join("ext/setup-scripts/dist").join(FLAG);
  assert_eq!(
    report.setup_scripts,
    vec![dir.join(format!("{}.sh", FLAG)), dir.join(format!("{}.csh", FLAG))]
  );

  let sh = std::fs::read_to_string(dir.join(format!("{}.sh", FLAG))).unwrap();
  assert!(sh.starts_with("# catch2 - 1.0\n"));
  assert!(sh.find("# catch2 - 1.0").unwrap() < sh.find("# fmt - 1.0").unwrap());

  let csh = std::fs::read_to_string(dir.join(format!("{}.csh", FLAG))).unwrap();
  assert!(csh.contains("if ( $?FMT_ROOT ) then"));
}

#[tokio::test]
async fn cycle_fails_before_anything_runs() {
  let temp = TempDir::new().unwrap();
  let mut orch = orchestrator(
    RecordingRunner::new(),
    vec![Toy::new("a"), Toy::new("b")],
    &[("a", &["b"]), ("b", &["a"])],
  );

  let err = orch.make_distribution("dist", &config(temp.path())).await.unwrap_err();

  assert!(matches!(err, BuildError::Graph(GraphError::Cycle { .. })));
  assert!(err.to_string().contains("dist"));
  assert!(orch.runner().labels().is_empty());
  assert!(!temp.path().join("ext").exists());
}

#[test]
fn dangling_dependency_fails_registration() {
  let mut registry = extmgr_lib::Registry::new();
  registry.register(std::sync::Arc::new(Toy::new("a"))).unwrap();
  let mut orch = extmgr_lib::Orchestrator::new(registry, RecordingRunner::new());

  let err = orch
    .register_distribution("dist", &[("a", "1.0")], &[("a", &["b"])])
    .unwrap_err();

  assert!(matches!(err, GraphError::DanglingDependency { .. }));
  assert!(orch.distribution("dist").is_none());
}

#[tokio::test]
async fn dry_run_plans_without_side_effects() {
  let temp = TempDir::new().unwrap();
  let config = config(temp.path()).with_dry_run(true);
  let mut orch = catch2_fmt(RecordingRunner::new());

  let report = orch.make_distribution("dist", &config).await.unwrap();

  assert_eq!(report.planned_steps(), 6);
  assert_eq!(report.executed_steps(), 0);
  assert!(orch.runner().labels().is_empty());
  assert!(!temp.path().join("ext").exists());
  assert!(!temp.path().join("build").exists());
}
