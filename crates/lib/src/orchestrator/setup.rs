//! Combined setup scripts of a distribution.
//!
//! One script per shell dialect, concatenating the setup commands of every
//! package in build order. Each block starts with `# <name> - <version>`
//! and ends with a blank line:
//!
//! ```text
//! # Catch2 - v3.5.4
//! if [ -z "$INCLUDE" ]; then
//!     export INCLUDE="/ext/Catch2/v3.5.4/x86_64-el9-gcc13-opt/include"
//! ...
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::BuildError;
use crate::package::SetupCommands;
use crate::shell::ShellDialect;

/// Setup commands of one built package.
#[derive(Debug, Clone)]
pub struct SetupBlock {
  pub name: String,
  pub version: String,
  pub cmds: SetupCommands,
}

/// Script text for `dialect`.
pub fn render_setup_script(dialect: ShellDialect, blocks: &[SetupBlock]) -> String {
  let mut lines: Vec<String> = Vec::new();
  for block in blocks {
    lines.push(dialect.comment(&format!("{} - {}", block.name, block.version)));
    if let Some(cmds) = block.cmds.get(&dialect) {
      lines.extend(cmds.iter().cloned());
    }
    lines.push(String::new());
  }

  lines.join("\n")
}

/// Path of the `dialect` setup script in `dir`.
pub fn setup_script_path(dir: &Path, build_flag: &str, dialect: ShellDialect) -> PathBuf {
  dir.join(format!("{}.{}", build_flag, dialect.script_extension()))
}

/// Write one setup script per dialect into `dir`.
pub async fn write_setup_scripts(dir: &Path, build_flag: &str, blocks: &[SetupBlock]) -> Result<Vec<PathBuf>, BuildError> {
  tokio::fs::create_dir_all(dir).await.map_err(|source| BuildError::Io {
    context: "failed to create setup script directory",
    path: dir.to_path_buf(),
    source,
  })?;

  let mut written = Vec::with_capacity(ShellDialect::ALL.len());
  for dialect in ShellDialect::ALL {
    let path = setup_script_path(dir, build_flag, dialect);
    let content = render_setup_script(dialect, blocks);

    tokio::fs::write(&path, content).await.map_err(|source| BuildError::Io {
      context: "failed to write setup script",
      path: path.clone(),
      source,
    })?;

    info!(shell = %dialect, path = %path.display(), "wrote setup script");
    written.push(path);
  }

  Ok(written)
}
