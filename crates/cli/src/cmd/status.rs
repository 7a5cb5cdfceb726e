//! Implementation of the `extmgr status` command.
//!
//! Shows, per package of a distribution, the next source and build step a
//! build would run. Nothing is executed.

use anyhow::{Context, Result};

use extmgr_lib::Orchestrator;
use extmgr_lib::execute::ShellRunner;

use super::ConfigArgs;
use crate::output::{print_info, print_stat, print_success, symbols};

pub fn cmd_status(args: &ConfigArgs) -> Result<()> {
  let config = args.to_config(false)?;
  let orchestrator = Orchestrator::with_builtins(ShellRunner::new()).context("Failed to register built-in distributions")?;

  let status = orchestrator
    .status(&args.distribution, &config)
    .with_context(|| format!("Failed to inspect distribution {}", args.distribution))?;

  let pending = status.iter().filter(|s| !s.pending.is_up_to_date()).count();
  if pending == 0 {
    print_success(&format!("{} is up to date", args.distribution));
  } else {
    print_info(&format!("{}: {} of {} package(s) pending", args.distribution, pending, status.len()));
  }
  print_stat("Build flag", &config.build_flag);
  println!();

  for package in &status {
    let describe = |next: &Option<String>| match next {
      Some(step) => format!("{} {}", symbols::ARROW, step),
      None => symbols::SUCCESS.to_string(),
    };
    println!(
      "  {} {} {}  source {}  build {}",
      symbols::INFO,
      package.name,
      package.version,
      describe(&package.pending.source),
      describe(&package.pending.build)
    );
  }

  Ok(())
}
