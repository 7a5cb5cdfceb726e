//! Package registry.
//!
//! Recipes are registered explicitly, once, under their (name, version).
//! The registry is a plain value handed to the orchestrator; there is no
//! process-wide table.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::GraphError;
use crate::package::Package;

/// Package name to version to recipe.
#[derive(Debug, Default)]
pub struct Registry {
  packages: BTreeMap<String, BTreeMap<String, Arc<dyn Package>>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding every built-in recipe.
  pub fn with_builtin_packages() -> Result<Self, GraphError> {
    let mut registry = Self::new();
    crate::recipes::register_builtin_packages(&mut registry)?;
    Ok(registry)
  }

  /// Add `package`. Fails if its (name, version) is already taken.
  pub fn register(&mut self, package: Arc<dyn Package>) -> Result<(), GraphError> {
    let versions = self.packages.entry(package.name().to_string()).or_default();

    if versions.contains_key(package.version()) {
      return Err(GraphError::DuplicatePackage {
        name: package.name().to_string(),
        version: package.version().to_string(),
      });
    }

    debug!(package = %package.name(), version = %package.version(), "registered package");
    versions.insert(package.version().to_string(), package);
    Ok(())
  }

  pub fn get(&self, name: &str, version: &str) -> Option<&Arc<dyn Package>> {
    self.packages.get(name)?.get(version)
  }

  /// Like [`Self::get`], but an unknown package is an error.
  pub fn lookup(&self, name: &str, version: &str) -> Result<Arc<dyn Package>, GraphError> {
    self.get(name, version).cloned().ok_or_else(|| GraphError::UnknownPackage {
      name: name.to_string(),
      version: version.to_string(),
    })
  }

  /// Registered versions of `name`, sorted.
  pub fn versions(&self, name: &str) -> Vec<&str> {
    self
      .packages
      .get(name)
      .map(|versions| versions.keys().map(String::as_str).collect())
      .unwrap_or_default()
  }

  /// Every registered (name, version), sorted by name then version.
  pub fn list(&self) -> Vec<(&str, &str)> {
    self
      .packages
      .iter()
      .flat_map(|(name, versions)| versions.keys().map(move |v| (name.as_str(), v.as_str())))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.packages.values().map(BTreeMap::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
