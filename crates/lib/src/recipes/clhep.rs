use crate::package::{Package, PackageContext, SetupCommands, Step};

use super::library_setup;

/// CLHEP, built with CMake from a release archive.
#[derive(Debug, Clone)]
pub struct Clhep {
  version: String,
  url: String,
}

impl Clhep {
  pub fn new(version: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      url: url.into(),
    }
  }
}

impl Package for Clhep {
  fn name(&self) -> &str {
    "CLHEP"
  }

  fn version(&self) -> &str {
    &self.version
  }

  fn prepare_source_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    let archive = ctx.download_path(&self.url);

    // The archive nests the sources under <version>/CLHEP.
    vec![
      Step::new("download", ctx.download_file(&self.url, Some(&archive), false)),
      Step::new("extract", ctx.extract_archive_to_source(&archive, 2)),
    ]
  }

  fn build_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    let no_args: &[(&str, &str)] = &[];
    vec![
      Step::new("config", ctx.cmake_config(no_args)),
      Step::new("build", ctx.cmake_build("install")),
    ]
  }

  fn setup_cmds(&self, ctx: &PackageContext<'_>) -> SetupCommands {
    library_setup(ctx.install_dir(), "lib", &format!("lib/CLHEP-{}", self.version))
  }
}
