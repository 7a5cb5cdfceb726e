use crate::package::{Layout, Package, PackageContext, SetupCommands, Step};

use super::library_setup;

/// Boost, bootstrapped and installed once for every build flag.
#[derive(Debug, Clone)]
pub struct Boost {
  version: String,
  url: String,
}

impl Boost {
  pub fn new(version: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      url: url.into(),
    }
  }
}

impl Package for Boost {
  fn name(&self) -> &str {
    "Boost"
  }

  fn version(&self) -> &str {
    &self.version
  }

  fn layout(&self) -> Layout {
    Layout::Shared
  }

  fn prepare_source_steps(&self, ctx: &PackageContext<'_>) -> Vec<Step> {
    let archive = ctx.download_path(&self.url);
    let src = ctx.source_dir().display();

    vec![
      Step::new("download", ctx.download_file(&self.url, Some(&archive), false)),
      Step::new("extract", ctx.extract_archive_to_source(&archive, 1)),
      Step::new(
        "build",
        vec![
          format!("cd {}", src),
          format!(
            "./bootstrap.sh --prefix={} --with-python=python3",
            ctx.install_dir().display()
          ),
        ],
      ),
      Step::new("install", vec![format!("cd {}", src), "./b2 install".to_string()]),
    ]
  }

  fn setup_cmds(&self, ctx: &PackageContext<'_>) -> SetupCommands {
    library_setup(ctx.install_dir(), "lib", &format!("lib/cmake/Boost-{}", self.version))
  }
}
