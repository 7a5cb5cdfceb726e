//! Built-in recipes and distributions.

mod boost;
mod catch2;
mod clhep;
mod fmt;

use std::path::Path;
use std::sync::Arc;

use crate::error::GraphError;
use crate::execute::ScriptRunner;
use crate::orchestrator::Orchestrator;
use crate::package::{SetupCommands, env_setup};
use crate::registry::Registry;

pub use boost::Boost;
pub use catch2::Catch2;
pub use clhep::Clhep;
pub use fmt::Fmt;

/// Register every built-in recipe.
pub fn register_builtin_packages(registry: &mut Registry) -> Result<(), GraphError> {
  registry.register(Arc::new(Catch2::new("v3.7.1")))?;
  registry.register(Arc::new(Catch2::new("v3.5.4")))?;
  registry.register(Arc::new(Fmt::new("10.2.1")))?;
  registry.register(Arc::new(Fmt::new("11.0.2")))?;
  registry.register(Arc::new(Clhep::new(
    "2.4.7.1",
    "https://lcgpackages.web.cern.ch/tarFiles/sources/clhep-2.4.7.1.tgz",
  )))?;
  registry.register(Arc::new(Boost::new(
    "1.85.0",
    "https://lcgpackages.web.cern.ch/tarFiles/sources/boost_1_85_0.tar.gz",
  )))?;
  Ok(())
}

/// Register every built-in distribution. The built-in recipes must already
/// be in the orchestrator's registry.
pub fn register_builtin_distributions<R: ScriptRunner>(orchestrator: &mut Orchestrator<R>) -> Result<(), GraphError> {
  let none: &[(&str, &[&str])] = &[];

  orchestrator.register_distribution("releaseA", &[("fmt", "11.0.2"), ("Catch2", "v3.7.1")], none)?;
  orchestrator.register_distribution("releaseB", &[("fmt", "10.2.1"), ("Catch2", "v3.5.4")], &[("fmt", &["Catch2"])])?;
  orchestrator.register_distribution("hep-base", &[("Boost", "1.85.0"), ("CLHEP", "2.4.7.1")], &[("CLHEP", &["Boost"])])?;
  Ok(())
}

/// Setup commands of a CMake-installed library: headers, libraries and the
/// CMake package directory.
fn library_setup(install_dir: &Path, lib_dir: &str, cmake_dir: &str) -> SetupCommands {
  let prefix = install_dir.display();
  env_setup(&[
    ("INCLUDE", format!("{}/include", prefix)),
    ("LIB", format!("{}/{}", prefix, lib_dir)),
    ("LD_LIBRARY_PATH", format!("{}/{}", prefix, lib_dir)),
    ("CMAKE_PREFIX_PATH", format!("{}/{}", prefix, cmake_dir)),
  ])
}
