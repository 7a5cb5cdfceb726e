use crate::package::{Package, PackageContext, SetupCommands, Step};

use super::library_setup;

const GIT_URL: &str = "https://github.com/catchorg/Catch2.git";

/// Catch2, cloned at its version tag and built with CMake.
#[derive(Debug, Clone)]
pub struct Catch2 {
  version: String,
}

impl Catch2 {
  pub fn new(version: impl Into<String>) -> Self {
    Self { version: version.into() }
  }
}

impl Package for Catch2 {
  fn name(&self) -> &str {
    "Catch2"
  }

  fn version(&self) -> &str {
    &self.version
  }

  fn prepare_source_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    vec![Step::new("clone", ctx.clone_git_repo(GIT_URL, &self.version, false))]
  }

  fn build_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    let no_args: &[(&str, &str)] = &[];
    vec![
      Step::new("config", ctx.cmake_config(no_args)),
      Step::new("build", ctx.cmake_build("install")),
    ]
  }

  fn setup_cmds(&self, ctx: &PackageContext<'_>) -> SetupCommands {
    library_setup(ctx.install_dir(), "lib64", "lib64/cmake/Catch2")
  }
}
