//! Distributions: named, dependency-ordered sets of packages.
//!
//! A distribution selects one version of each of its packages from the
//! [`Registry`] and records which members must be built before which. The
//! relation lives in a [`DiGraph`] with one node per member, in selection
//! order, and one edge per dependency pointing from the dependency to its
//! dependent.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::GraphError;
use crate::package::Package;
use crate::registry::Registry;

/// A validated distribution.
#[derive(Debug)]
pub struct Distribution {
  name: String,
  graph: DiGraph<Arc<dyn Package>, ()>,
  nodes: HashMap<String, NodeIndex>,
}

impl Distribution {
  /// Select `packages` (name, version) from `registry` and record
  /// `dependencies` (package name, names it depends on).
  ///
  /// Every selected package must be registered and selected once. Every
  /// name in `dependencies`, key or value, must be a selected member.
  /// Cycles are not detected here; see [`Self::sorted_packages`].
  pub fn new<S, D>(name: &str, registry: &Registry, packages: &[(S, S)], dependencies: &[(S, D)]) -> Result<Self, GraphError>
  where
    S: AsRef<str>,
    D: AsRef<[S]>,
  {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for (pkg_name, version) in packages {
      let (pkg_name, version) = (pkg_name.as_ref(), version.as_ref());
      let package = registry.lookup(pkg_name, version)?;

      if nodes.contains_key(pkg_name) {
        return Err(GraphError::DuplicateMember {
          distribution: name.to_string(),
          package: pkg_name.to_string(),
        });
      }

      nodes.insert(pkg_name.to_string(), graph.add_node(package));
    }

    let mut declared: HashMap<&str, Vec<&str>> = HashMap::new();
    for (dependent, deps) in dependencies {
      let dependent = dependent.as_ref();
      if !nodes.contains_key(dependent) {
        return Err(GraphError::NotAMember {
          distribution: name.to_string(),
          package: dependent.to_string(),
        });
      }
      declared
        .entry(dependent)
        .or_default()
        .extend(deps.as_ref().iter().map(|dep| dep.as_ref()));
    }

    // Walk members in selection order so dependents sharing a dependency are
    // released in selection order too.
    for (dependent, _) in packages {
      let dependent = dependent.as_ref();
      let dependent_idx = nodes[dependent];

      for &dep in declared.get(dependent).into_iter().flatten() {
        let Some(&dep_idx) = nodes.get(dep) else {
          return Err(GraphError::DanglingDependency {
            distribution: name.to_string(),
            package: dependent.to_string(),
            dependency: dep.to_string(),
          });
        };

        // Edge from dependency to dependent
        graph.update_edge(dep_idx, dependent_idx, ());
      }
    }

    debug!(
      distribution = %name,
      packages = graph.node_count(),
      dependencies = graph.edge_count(),
      "registered distribution"
    );

    Ok(Self {
      name: name.to_string(),
      graph,
      nodes,
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Members in selection order.
  pub fn packages(&self) -> Vec<Arc<dyn Package>> {
    self.graph.node_weights().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// Names `package` depends on, in declaration order.
  pub fn dependencies_of(&self, package: &str) -> Vec<&str> {
    let Some(&idx) = self.nodes.get(package) else {
      return Vec::new();
    };

    let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Incoming).collect();
    edges.sort_by_key(|e| e.id());
    edges.iter().map(|e| self.graph[e.source()].name()).collect()
  }

  /// Members ordered so every package comes after its dependencies.
  ///
  /// Kahn's algorithm: start from the members without dependencies in
  /// selection order, and release the dependents of each member in
  /// selection order. Ties therefore resolve deterministically. A cycle yields an
  /// error naming the members that could not be ordered.
  pub fn sorted_packages(&self) -> Result<Vec<Arc<dyn Package>>, GraphError> {
    let mut in_degree: Vec<usize> = self
      .graph
      .node_indices()
      .map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count())
      .collect();

    let mut queue: VecDeque<NodeIndex> = self
      .graph
      .node_indices()
      .filter(|idx| in_degree[idx.index()] == 0)
      .collect();

    let mut sorted = Vec::with_capacity(self.graph.node_count());
    while let Some(idx) = queue.pop_front() {
      sorted.push(idx);

      let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).collect();
      edges.sort_by_key(|e| e.id());

      for edge in edges {
        let dependent = edge.target();
        in_degree[dependent.index()] -= 1;
        if in_degree[dependent.index()] == 0 {
          queue.push_back(dependent);
        }
      }
    }

    if sorted.len() < self.graph.node_count() {
      let remaining = self
        .graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] > 0)
        .map(|idx| self.graph[idx].name().to_string())
        .collect();

      return Err(GraphError::Cycle {
        distribution: self.name.clone(),
        remaining,
      });
    }

    Ok(sorted.into_iter().map(|idx| Arc::clone(&self.graph[idx])).collect())
  }
}
