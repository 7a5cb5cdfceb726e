use crate::package::{Package, PackageContext, SetupCommands, Step};

use super::library_setup;

const GIT_URL: &str = "https://github.com/fmtlib/fmt.git";

/// {fmt}, cloned at its version tag and built as a shared library.
#[derive(Debug, Clone)]
pub struct Fmt {
  version: String,
  git_tag: String,
}

impl Fmt {
  pub fn new(version: impl Into<String>) -> Self {
    let version = version.into();
    Self {
      git_tag: version.clone(),
      version,
    }
  }

  /// Check out `tag` instead of the version string.
  pub fn with_git_tag(mut self, tag: impl Into<String>) -> Self {
    self.git_tag = tag.into();
    self
  }
}

impl Package for Fmt {
  fn name(&self) -> &str {
    "fmt"
  }

  fn version(&self) -> &str {
    &self.version
  }

  fn prepare_source_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    vec![Step::new("clone", ctx.clone_git_repo(GIT_URL, &self.git_tag, false))]
  }

  fn build_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    vec![
      Step::new("config", ctx.cmake_config(&[("BUILD_SHARED_LIBS", "TRUE")])),
      Step::new("build", ctx.cmake_build("install")),
    ]
  }

  fn setup_cmds(&self, ctx: &PackageContext<'_>) -> SetupCommands {
    library_setup(ctx.install_dir(), "lib64", "lib64/cmake/fmt")
  }
}
