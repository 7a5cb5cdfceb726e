//! Distribution orchestration.
//!
//! The [`Orchestrator`] owns the package [`Registry`], the registered
//! [`Distribution`]s and the [`ScriptRunner`] every step goes through. Making
//! a distribution builds its packages one at a time in dependency order.
//! Each package sees the POSIX setup commands of every package built before
//! it as a prefix to its own scripts.

pub mod setup;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::BuildConfig;
use crate::distribution::Distribution;
use crate::error::{BuildError, ConfigurationError, GraphError};
use crate::execute::ScriptRunner;
use crate::package::{ConfiguredPackage, Package, PendingSteps, RunReport};
use crate::registry::Registry;
use crate::shell::ShellDialect;

pub use setup::{SetupBlock, render_setup_script, setup_script_path, write_setup_scripts};

/// Where the last [`Orchestrator::make_distribution`] call got to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BuildState {
  #[default]
  Idle,
  /// Building the package at this position of the sorted order.
  Building(usize),
  Succeeded,
  /// Stopped by an error, attributed to a package when one was running.
  Failed { package: Option<String> },
  /// Stopped by the operator.
  Interrupted,
}

impl BuildState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed { .. } | Self::Interrupted)
  }
}

impl fmt::Display for BuildState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Idle => write!(f, "idle"),
      Self::Building(i) => write!(f, "building package #{}", i + 1),
      Self::Succeeded => write!(f, "succeeded"),
      Self::Failed { package: Some(p) } => write!(f, "failed at {}", p),
      Self::Failed { package: None } => write!(f, "failed"),
      Self::Interrupted => write!(f, "interrupted"),
    }
  }
}

/// Outcome of one package within a distribution build.
#[derive(Debug, Clone)]
pub struct PackageReport {
  pub name: String,
  pub version: String,
  pub run: RunReport,
}

/// Outcome of a successful [`Orchestrator::make_distribution`].
#[derive(Debug, Clone, Default)]
pub struct DistributionReport {
  pub name: String,
  pub packages: Vec<PackageReport>,
  /// Setup scripts written, empty in dry-run mode.
  pub setup_scripts: Vec<PathBuf>,
}

impl DistributionReport {
  /// Number of steps that ran.
  pub fn executed_steps(&self) -> usize {
    self.packages.iter().map(|p| p.run.executed.len()).sum()
  }

  /// Number of steps a dry run would have run.
  pub fn planned_steps(&self) -> usize {
    self.packages.iter().map(|p| p.run.planned.len()).sum()
  }

  pub fn is_up_to_date(&self) -> bool {
    self.packages.iter().all(|p| p.run.is_up_to_date())
  }
}

/// Pending work of one package, as reported by [`Orchestrator::status`].
#[derive(Debug, Clone)]
pub struct PackageStatus {
  pub name: String,
  pub version: String,
  pub pending: PendingSteps,
  pub stamp_path: PathBuf,
}

/// Drives distributions through a [`ScriptRunner`].
pub struct Orchestrator<R> {
  registry: Registry,
  distributions: BTreeMap<String, Distribution>,
  runner: R,
  state: BuildState,
}

impl<R: ScriptRunner> Orchestrator<R> {
  pub fn new(registry: Registry, runner: R) -> Self {
    Self {
      registry,
      distributions: BTreeMap::new(),
      runner,
      state: BuildState::Idle,
    }
  }

  /// An orchestrator holding the built-in recipes and distributions.
  pub fn with_builtins(runner: R) -> Result<Self, GraphError> {
    let mut orchestrator = Self::new(Registry::with_builtin_packages()?, runner);
    crate::recipes::register_builtin_distributions(&mut orchestrator)?;
    Ok(orchestrator)
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// State reached by the last build.
  pub fn state(&self) -> &BuildState {
    &self.state
  }

  pub fn distribution(&self, name: &str) -> Option<&Distribution> {
    self.distributions.get(name)
  }

  /// Registered distributions, sorted by name.
  pub fn distributions(&self) -> impl Iterator<Item = &Distribution> {
    self.distributions.values()
  }

  /// Register a distribution of registered packages.
  ///
  /// See [`Distribution::new`] for the checks applied. A name can only be
  /// registered once.
  pub fn register_distribution<S, D>(&mut self, name: &str, packages: &[(S, S)], dependencies: &[(S, D)]) -> Result<(), GraphError>
  where
    S: AsRef<str>,
    D: AsRef<[S]>,
  {
    if self.distributions.contains_key(name) {
      return Err(GraphError::DuplicateDistribution(name.to_string()));
    }

    let distribution = Distribution::new(name, &self.registry, packages, dependencies)?;
    self.distributions.insert(name.to_string(), distribution);
    Ok(())
  }

  fn sorted(&self, name: &str) -> Result<Vec<Arc<dyn Package>>, BuildError> {
    let distribution = self
      .distributions
      .get(name)
      .ok_or_else(|| ConfigurationError::UnknownDistribution(name.to_string()))?;
    Ok(distribution.sorted_packages()?)
  }

  /// Build every package of distribution `name` under `config`.
  ///
  /// Packages run in dependency order and the first failure stops the
  /// build. Once every package succeeded, and unless this is a dry run, the
  /// combined setup scripts are written under
  /// `<install_root>/setup-scripts/<name>/<build_flag>/`.
  pub async fn make_distribution(&mut self, name: &str, config: &BuildConfig) -> Result<DistributionReport, BuildError> {
    self.state = BuildState::Idle;

    let packages = match self.sorted(name) {
      Ok(packages) => packages,
      Err(e) => {
        error!(distribution = %name, "{}", e);
        self.state = BuildState::Failed { package: None };
        return Err(e);
      }
    };

    info!(
      distribution = %name,
      packages = packages.len(),
      build_flag = %config.build_flag,
      dry_run = config.dry_run,
      "making distribution"
    );

    let mut report = DistributionReport {
      name: name.to_string(),
      ..Default::default()
    };
    let mut env_prefix: Vec<String> = Vec::new();
    let mut blocks = Vec::with_capacity(packages.len());

    for (i, package) in packages.iter().enumerate() {
      self.state = BuildState::Building(i);
      info!(distribution = %name, "building package {} {}", package.name(), package.version());

      let block = match build_package(package.as_ref(), config, &env_prefix, &self.runner).await {
        Ok((run, block)) => {
          report.packages.push(PackageReport {
            name: package.name().to_string(),
            version: package.version().to_string(),
            run,
          });
          block
        }
        Err(e) => {
          if e.is_interrupted() {
            warn!(distribution = %name, package = %package.id(), "interrupted by user");
            self.state = BuildState::Interrupted;
          } else {
            error!(distribution = %name, package = %package.id(), "failed to make package: {}", e);
            self.state = BuildState::Failed {
              package: Some(package.id()),
            };
          }
          return Err(e);
        }
      };

      let sh = block.cmds.get(&ShellDialect::Sh).cloned().unwrap_or_default();
      if config.dry_run {
        info!("add environment setup commands:");
        info!(" $ -----------------------");
        for cmd in &sh {
          info!(" $ {}", cmd);
        }
        info!(" $ -----------------------");
      }
      env_prefix.extend(sh);
      blocks.push(block);
    }

    if self.runner.interrupted() {
      warn!(distribution = %name, "interrupted by user");
      self.state = BuildState::Interrupted;
      return Err(BuildError::InterruptedBeforeSetupScripts {
        distribution: name.to_string(),
      });
    }

    if !config.dry_run {
      let dir = config.setup_script_dir(name);
      match write_setup_scripts(&dir, &config.build_flag, &blocks).await {
        Ok(written) => report.setup_scripts = written,
        Err(e) => {
          error!(distribution = %name, "{}", e);
          self.state = BuildState::Failed { package: None };
          return Err(e);
        }
      }
    }

    info!(
      distribution = %name,
      executed = report.executed_steps(),
      planned = report.planned_steps(),
      "distribution complete"
    );
    self.state = BuildState::Succeeded;
    Ok(report)
  }

  /// Next source and build step of every package of `name`, in build order,
  /// without running anything.
  pub fn status(&self, name: &str, config: &BuildConfig) -> Result<Vec<PackageStatus>, BuildError> {
    self
      .sorted(name)?
      .iter()
      .map(|package| -> Result<PackageStatus, BuildError> {
        let configured = package.attach_configuration(config)?;
        Ok(PackageStatus {
          name: package.name().to_string(),
          version: package.version().to_string(),
          pending: configured.pending(),
          stamp_path: configured.stamp_path(),
        })
      })
      .collect()
  }
}

/// Attach, run, and collect the setup commands of one package.
async fn build_package<R: ScriptRunner>(
  package: &dyn Package,
  config: &BuildConfig,
  env_prefix: &[String],
  runner: &R,
) -> Result<(RunReport, SetupBlock), BuildError> {
  let mut configured = ConfiguredPackage::attach(package, config)?;
  let run = configured.run(env_prefix, runner).await?;

  let block = SetupBlock {
    name: package.name().to_string(),
    version: package.version().to_string(),
    cmds: configured.setup_cmds(),
  };
  Ok((run, block))
}
