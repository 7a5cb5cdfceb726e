//! Subcommands and the configuration flags they share.

mod build;
mod list;
mod status;

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use extmgr_lib::platform::detect_build_flag;
use extmgr_lib::{BuildConfig, BuildType};

pub use build::{BuildArgs, cmd_build};
pub use list::cmd_list;
pub use status::cmd_status;

/// Flags selecting a distribution and the configuration to build it in.
#[derive(Debug, Args)]
pub struct ConfigArgs {
  /// Distribution to operate on
  #[arg(short, long)]
  pub distribution: String,

  /// Install prefix (sources, installs, stamps and setup scripts)
  #[arg(short, long, env = "EXTMGR_PREFIX")]
  pub prefix: PathBuf,

  /// Root of the build trees
  #[arg(long, env = "EXTMGR_BUILD_DIR", default_value = "build")]
  pub build_dir: PathBuf,

  /// Directory holding patch files
  #[arg(long, env = "EXTMGR_PATCH_DIR", default_value = "patches")]
  pub patch_dir: PathBuf,

  /// Parallel jobs passed to the native build tool
  #[arg(short, long, default_value_t = NonZeroUsize::MIN)]
  pub jobs: NonZeroUsize,

  /// Build with CMAKE_BUILD_TYPE=Release (default)
  #[arg(long, group = "build_type")]
  pub release: bool,

  /// Build with CMAKE_BUILD_TYPE=Debug
  #[arg(long, group = "build_type")]
  pub debug: bool,

  /// Build with CMAKE_BUILD_TYPE=RelWithDebInfo
  #[arg(long, group = "build_type")]
  pub relwithdebinfo: bool,

  /// Use this build flag instead of detecting one, e.g. x86_64-el9-gcc13-opt
  #[arg(long)]
  pub build_flag: Option<String>,
}

impl ConfigArgs {
  pub fn build_type(&self) -> BuildType {
    if self.debug {
      BuildType::Debug
    } else if self.relwithdebinfo {
      BuildType::RelWithDebInfo
    } else {
      BuildType::Release
    }
  }

  /// Resolve paths and the build flag into a [`BuildConfig`].
  pub fn to_config(&self, dry_run: bool) -> Result<BuildConfig> {
    let build_type = self.build_type();
    let build_flag = match &self.build_flag {
      Some(flag) => flag.clone(),
      None => detect_build_flag(build_type).context("Failed to detect build flag, pass --build-flag")?,
    };

    let config = BuildConfig::new(
      absolute(&self.patch_dir)?,
      absolute(&self.build_dir)?,
      absolute(&self.prefix)?,
      build_type,
      build_flag,
    )
    .with_jobs(self.jobs)
    .with_dry_run(dry_run);

    info!(distribution = %self.distribution, "distribution");
    info!(path = %config.install_root.display(), "install prefix");
    info!(path = %config.build_root.display(), "build directory");
    info!(path = %config.patch_dir.display(), "patch directory");
    info!(jobs = config.job_count, build_type = %config.build_type, "build settings");
    info!(build_flag = %config.build_flag, "build flag");

    Ok(config)
  }
}

/// `path` made absolute without requiring it to exist.
fn absolute(path: &Path) -> Result<PathBuf> {
  match dunce::canonicalize(path) {
    Ok(p) => Ok(p),
    Err(_) => std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display())),
  }
}
