//! Implementation of the `extmgr list` command.

use anyhow::{Context, Result};
use serde::Serialize;

use extmgr_lib::Orchestrator;
use extmgr_lib::execute::ShellRunner;

use crate::output::{print_json, symbols};

#[derive(Debug, Serialize)]
struct PackageEntry {
  name: String,
  version: String,
  dependencies: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DistributionEntry {
  name: String,
  packages: Vec<PackageEntry>,
}

/// List the built-in distributions with their packages in build order.
pub fn cmd_list(json: bool) -> Result<()> {
  let orchestrator = Orchestrator::with_builtins(ShellRunner::new()).context("Failed to register built-in distributions")?;

  let mut entries = Vec::new();
  for distribution in orchestrator.distributions() {
    let packages = distribution
      .sorted_packages()
      .with_context(|| format!("Failed to order distribution {}", distribution.name()))?
      .iter()
      .map(|p| PackageEntry {
        name: p.name().to_string(),
        version: p.version().to_string(),
        dependencies: distribution
          .dependencies_of(p.name())
          .into_iter()
          .map(str::to_string)
          .collect(),
      })
      .collect();

    entries.push(DistributionEntry {
      name: distribution.name().to_string(),
      packages,
    });
  }

  if json {
    return print_json(&entries);
  }

  for entry in &entries {
    println!("{}", entry.name);
    for package in &entry.packages {
      if package.dependencies.is_empty() {
        println!("  {} {} {}", symbols::INFO, package.name, package.version);
      } else {
        println!(
          "  {} {} {} (needs {})",
          symbols::INFO,
          package.name,
          package.version,
          package.dependencies.join(", ")
        );
      }
    }
  }

  Ok(())
}
