//! The package step state machine.
//!
//! A configured package runs its two step groups in order. Within a group
//! it starts at [`next_step_index`] and runs every step from there to the
//! end, stamping and persisting each one as soon as it succeeds. A failure
//! or interruption stops the run; whatever was stamped before stays valid,
//! so the next invocation resumes where this one stopped.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::config::BuildConfig;
use crate::error::{BuildError, ConfigurationError};
use crate::execute::{ScriptRequest, ScriptRunner, ScriptStatus, script_body};
use crate::shell::ShellDialect;

use super::{Layout, Package, PackageContext, PackageDirs, SetupCommands, StampMap, Step, next_step_index};

/// What a call to [`ConfiguredPackage::run`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
  /// Stamp keys of the steps that ran and completed.
  pub executed: Vec<String>,
  /// Stamp keys of the steps a dry run would have run.
  pub planned: Vec<String>,
}

impl RunReport {
  pub fn is_up_to_date(&self) -> bool {
    self.executed.is_empty() && self.planned.is_empty()
  }
}

/// Next step of each group, without running anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSteps {
  pub source: Option<String>,
  pub build: Option<String>,
}

impl PendingSteps {
  pub fn is_up_to_date(&self) -> bool {
    self.source.is_none() && self.build.is_none()
  }
}

impl dyn Package {
  /// Bind this recipe to `config`. See [`ConfiguredPackage::attach`].
  pub fn attach_configuration<'a>(&'a self, config: &'a BuildConfig) -> Result<ConfiguredPackage<'a>, ConfigurationError> {
    ConfiguredPackage::attach(self, config)
  }
}

/// A recipe bound to a configuration.
pub struct ConfiguredPackage<'a> {
  package: &'a dyn Package,
  ctx: PackageContext<'a>,
  stamps: StampMap,
}

impl<'a> ConfiguredPackage<'a> {
  /// Bind `package` to `config`.
  ///
  /// Directories are derived and the stamp file is loaded fresh on every
  /// call. Fails when a required patch is missing or the stamp file is
  /// unreadable.
  pub fn attach(package: &'a dyn Package, config: &'a BuildConfig) -> Result<Self, ConfigurationError> {
    let ctx = PackageContext::new(package.name(), package.version(), package.layout(), config);

    for patch in package.required_patches() {
      let path = config.patch_path(&patch);
      if !path.is_file() {
        return Err(ConfigurationError::MissingPatch {
          package: package.id(),
          path,
        });
      }
    }

    let stamps = StampMap::load(&ctx.dirs.stamp_path)?;
    debug!(package = %package.id(), stamps = stamps.len(), build_flag = %config.build_flag, "configured package");

    Ok(Self { package, ctx, stamps })
  }

  pub fn name(&self) -> &str {
    self.package.name()
  }

  pub fn version(&self) -> &str {
    self.package.version()
  }

  pub fn id(&self) -> String {
    self.package.id()
  }

  pub fn context(&self) -> &PackageContext<'a> {
    &self.ctx
  }

  pub fn dirs(&self) -> &PackageDirs {
    &self.ctx.dirs
  }

  pub fn stamps(&self) -> &StampMap {
    &self.stamps
  }

  pub fn source_steps(&self) -> Vec<Step> {
    self.package.prepare_source_steps(&self.ctx)
  }

  pub fn build_steps(&self) -> Vec<Step> {
    self.package.build_steps(&self.ctx)
  }

  pub fn setup_cmds(&self) -> SetupCommands {
    self.package.setup_cmds(&self.ctx)
  }

  /// POSIX setup commands, appended to the env prefix of later packages.
  pub fn sh_setup_cmds(&self) -> Vec<String> {
    self.setup_cmds().remove(&ShellDialect::Sh).unwrap_or_default()
  }

  /// Stamp key of a build-phase step.
  pub fn build_step_key(&self, step: &str) -> String {
    format!("{}-{}", self.ctx.config.build_flag, step)
  }

  /// Next step of each group given the current stamps.
  pub fn pending(&self) -> PendingSteps {
    let source = self.source_steps();
    let build = self.build_steps();

    let source_keys: Vec<String> = source.iter().map(|s| s.name.clone()).collect();
    let build_keys: Vec<String> = build.iter().map(|s| self.build_step_key(&s.name)).collect();

    PendingSteps {
      source: self.first_pending(&source_keys).map(|i| source[i].name.clone()),
      build: self.first_pending(&build_keys).map(|i| build[i].name.clone()),
    }
  }

  fn first_pending(&self, keys: &[String]) -> Option<usize> {
    let stamps: Vec<u64> = keys.iter().map(|k| self.stamps.get(k)).collect();
    next_step_index(&stamps)
  }

  /// Run every pending step, source preparation first.
  ///
  /// `env_prefix` is prepended to every script. In dry-run mode the steps
  /// that would run are logged and nothing on disk changes.
  pub async fn run<R: ScriptRunner>(&mut self, env_prefix: &[String], runner: &R) -> Result<RunReport, BuildError> {
    let id = self.id();
    info!(package = %id, "making package");

    self.prepare_directories().await?;

    let mut report = RunReport::default();

    let source: Vec<(String, Step)> = self.source_steps().into_iter().map(|s| (s.name.clone(), s)).collect();
    info!(package = %id, "preparing source");
    self.exec_steps(env_prefix, &source, runner, &mut report).await?;

    let build = self.build_steps();
    if self.package.layout() == Layout::Shared && !build.is_empty() {
      warn!(package = %id, "shared-location package declares build steps");
    }
    let build: Vec<(String, Step)> = build.into_iter().map(|s| (self.build_step_key(&s.name), s)).collect();
    info!(package = %id, build_flag = %self.ctx.config.build_flag, "building package");
    self.exec_steps(env_prefix, &build, runner, &mut report).await?;

    if !report.executed.is_empty() {
      self.check_setup(env_prefix, runner).await?;
    }

    Ok(report)
  }

  async fn prepare_directories(&self) -> Result<(), BuildError> {
    for dir in self.ctx.dirs.to_create() {
      if self.ctx.config.dry_run {
        info!(package = %self.id(), "going to make {}", dir.display());
        continue;
      }

      tokio::fs::create_dir_all(dir).await.map_err(|source| BuildError::Io {
        context: "failed to create directory",
        path: dir.to_path_buf(),
        source,
      })?;
    }
    Ok(())
  }

  async fn exec_steps<R: ScriptRunner>(
    &mut self,
    env_prefix: &[String],
    steps: &[(String, Step)],
    runner: &R,
    report: &mut RunReport,
  ) -> Result<(), BuildError> {
    let id = self.id();
    let keys: Vec<String> = steps.iter().map(|(key, _)| key.clone()).collect();

    let Some(start) = self.first_pending(&keys) else {
      info!(package = %id, "all steps are up-to-date, skipping");
      return Ok(());
    };

    for key in &keys[..start] {
      info!(package = %id, step = %key, "step is up-to-date");
    }

    for (key, step) in &steps[start..] {
      info!(package = %id, step = %key, "running step");

      if self.ctx.config.dry_run {
        info!(package = %id, step = %key, "going to execute:");
        for cmd in &step.cmds {
          info!(" $ {}", cmd);
        }
        report.planned.push(key.clone());
        continue;
      }

      let body = script_body(env_prefix.iter().chain(step.cmds.iter()));
      let label = format!("{}/{}", id, key);
      let output = runner
        .run(ScriptRequest {
          label: &label,
          body: &body,
          script_path: &self.ctx.dirs.script_path,
          work_dir: &self.ctx.dirs.build_dir,
        })
        .await
        .map_err(|source| BuildError::Execute {
          package: id.clone(),
          source,
        })?;

      match output.status {
        ScriptStatus::Success => {
          let stamp = self.stamps.touch(key);
          self.stamps.save(&self.ctx.dirs.stamp_path).map_err(|source| BuildError::Io {
            context: "failed to write stamp file",
            path: self.ctx.dirs.stamp_path.clone(),
            source,
          })?;
          info!(package = %id, step = %key, stamp, "step completed");
          report.executed.push(key.clone());
        }
        ScriptStatus::Failed(code) => {
          error!(package = %id, step = %key, ?code, "failed to run step");
          return Err(BuildError::StepFailed {
            package: id,
            step: step.name.clone(),
            code,
          });
        }
        ScriptStatus::Interrupted => {
          warn!(package = %id, step = %key, "interrupted by user");
          return Err(BuildError::Interrupted {
            package: id,
            step: step.name.clone(),
          });
        }
      }
    }

    Ok(())
  }

  /// Run the package's own POSIX setup commands once after a build, so a
  /// broken setup is reported against the package that produced it.
  async fn check_setup<R: ScriptRunner>(&self, env_prefix: &[String], runner: &R) -> Result<(), BuildError> {
    let id = self.id();
    info!(package = %id, "examining environment setup commands");

    let setup = self.sh_setup_cmds();
    let body = script_body(env_prefix.iter().chain(setup.iter()));
    let label = format!("{}/setup-check", id);
    let output = runner
      .run(ScriptRequest {
        label: &label,
        body: &body,
        script_path: &self.ctx.dirs.script_path,
        work_dir: &self.ctx.dirs.build_dir,
      })
      .await
      .map_err(|source| BuildError::Execute {
        package: id.clone(),
        source,
      })?;

    match output.status {
      ScriptStatus::Success => Ok(()),
      ScriptStatus::Failed(code) => {
        error!(package = %id, ?code, "failed to run environment setup commands");
        Err(BuildError::SetupCheckFailed { package: id, code })
      }
      ScriptStatus::Interrupted => Err(BuildError::Interrupted {
        package: id,
        step: "setup-check".to_string(),
      }),
    }
  }

  /// Path of the stamp file, for diagnostics.
  pub fn stamp_path(&self) -> PathBuf {
    self.ctx.dirs.stamp_path.clone()
  }
}
