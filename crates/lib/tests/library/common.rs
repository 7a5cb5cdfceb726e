//! Shared helpers for library integration tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use extmgr_lib::execute::{ExecuteError, ScriptOutput, ScriptRequest, ScriptRunner, ScriptStatus};
use extmgr_lib::package::{SetupCommands, env_setup};
use extmgr_lib::{BuildConfig, BuildType, Orchestrator, Package, PackageContext, Registry, Step};
use tempfile::TempDir;

pub const FLAG: &str = "x86_64-el9-gcc13-opt";

/// Records every script and answers success unless told otherwise.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  scripts: Mutex<Vec<(String, String)>>,
  outcomes: HashMap<String, ScriptStatus>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_when(mut self, label: &str, status: ScriptStatus) -> Self {
    self.outcomes.insert(label.to_string(), status);
    self
  }

  pub fn labels(&self) -> Vec<String> {
    self.scripts.lock().unwrap().iter().map(|(l, _)| l.clone()).collect()
  }

  /// Body of the first script with `label`.
  pub fn body(&self, label: &str) -> Option<String> {
    self
      .scripts
      .lock()
      .unwrap()
      .iter()
      .find(|(l, _)| l == label)
      .map(|(_, b)| b.clone())
  }
}

impl ScriptRunner for RecordingRunner {
  async fn run(&self, request: ScriptRequest<'_>) -> Result<ScriptOutput, ExecuteError> {
    self
      .scripts
      .lock()
      .unwrap()
      .push((request.label.to_string(), request.body.to_string()));
    let status = self.outcomes.get(request.label).copied().unwrap_or(ScriptStatus::Success);
    Ok(ScriptOutput::with_status(status))
  }
}

/// A recipe whose steps only touch files, so it runs under a real shell.
///
/// Each step appends its name to `<install_dir>/log`. The setup commands
/// export `<NAME>_ROOT` pointing at the install directory.
pub struct Toy {
  pub name: &'static str,
  pub version: &'static str,
  pub source: Vec<&'static str>,
  pub build: Vec<&'static str>,
  /// Extra commands appended to the last build step.
  pub extra: Vec<String>,
}

impl Toy {
  pub fn new(name: &'static str) -> Self {
    Self {
      name,
      version: "1.0",
      source: vec!["fetch"],
      build: vec!["config", "build"],
      extra: Vec::new(),
    }
  }

  pub fn root_var(&self) -> String {
    format!("{}_ROOT", self.name.to_uppercase())
  }
}

impl Package for Toy {
  fn name(&self) -> &str {
    self.name
  }

  fn version(&self) -> &str {
    self.version
  }

  fn prepare_source_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    let log = ctx.install_dir().join("log");
    self
      .source
      .iter()
      .map(|s| Step::new(*s, vec![format!("echo {} >> {}", s, log.display())]))
      .collect()
  }

  fn build_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    let log = ctx.install_dir().join("log");
    let mut steps: Vec<Step> = self
      .build
      .iter()
      .map(|s| Step::new(*s, vec![format!("echo {} >> {}", s, log.display())]))
      .collect();
    if let Some(last) = steps.last_mut() {
      last.cmds.extend(self.extra.iter().cloned());
    }
    steps
  }

  fn setup_cmds(&self, ctx: &PackageContext<'_>) -> SetupCommands {
    env_setup(&[(self.root_var(), ctx.install_dir().display().to_string())])
  }
}

pub fn config(root: &Path) -> BuildConfig {
  BuildConfig::new(
    root.join("patches"),
    root.join("build"),
    root.join("ext"),
    BuildType::Release,
    FLAG,
  )
}

/// Orchestrator over `packages` with one distribution `dist`.
pub fn orchestrator<R: ScriptRunner>(
  runner: R,
  packages: Vec<Toy>,
  dependencies: &[(&str, &[&str])],
) -> Orchestrator<R> {
  let mut registry = Registry::new();
  let selection: Vec<(&str, &str)> = packages.iter().map(|p| (p.name, p.version)).collect();
  for package in packages {
    registry.register(Arc::new(package)).unwrap();
  }

  let mut orchestrator = Orchestrator::new(registry, runner);
  orchestrator
    .register_distribution("dist", &selection, dependencies)
    .unwrap();
  orchestrator
}

pub fn install_dir(temp: &TempDir, name: &str) -> PathBuf {
  temp.path().join("ext").join(name).join("1.0").join(FLAG)
}

pub fn build_label(package: &str, step: &str) -> String {
  format!("{}-1.0/{}-{}", package, FLAG, step)
}
