//! Implementation of the `extmgr build` command.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use extmgr_lib::Orchestrator;
use extmgr_lib::execute::ShellRunner;

use super::ConfigArgs;
use crate::output::{format_elapsed, print_info, print_stat, print_success};

#[derive(Debug, Args)]
pub struct BuildArgs {
  #[command(flatten)]
  pub config: ConfigArgs,

  /// Only print the commands that would run
  #[arg(long)]
  pub dry_run: bool,

  /// Shell executing the generated scripts
  #[arg(long, default_value = "bash")]
  pub shell: String,
}

/// Build a distribution.
///
/// Packages are built in dependency order, each resuming from its step
/// stamps. Prints a summary with the number of steps run and the setup
/// scripts written.
pub fn cmd_build(args: &BuildArgs) -> Result<()> {
  let config = args.config.to_config(args.dry_run)?;
  let runner = ShellRunner::new().with_shell(&args.shell);
  let mut orchestrator = Orchestrator::with_builtins(runner).context("Failed to register built-in distributions")?;

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(orchestrator.make_distribution(&args.config.distribution, &config))
    .with_context(|| format!("Failed to make distribution {}", args.config.distribution))?;

  println!();
  if config.dry_run {
    print_info(&format!(
      "Dry run of {}: {} step(s) would run",
      report.name,
      report.planned_steps()
    ));
  } else if report.is_up_to_date() {
    print_success(&format!("{} is up to date", report.name));
  } else {
    print_success(&format!("Built {}", report.name));
  }

  print_stat("Build flag", &config.build_flag);
  print_stat("Packages", &report.packages.len().to_string());
  if !config.dry_run {
    print_stat("Steps executed", &report.executed_steps().to_string());
  }
  print_stat("Elapsed", &format_elapsed(started.elapsed()));

  for script in &report.setup_scripts {
    print_stat("Setup script", &script.display().to_string());
  }

  Ok(())
}
