//! # Dependency Resolution
//!
//! Orders modules so every provider of a capability runs before the modules
//! that require it.
//!
//! ## Graph construction
//!
//! 1. `provides_map`: capability name → modules listing it under `provides`.
//! 2. For each module and each capability it `requires`, an edge to every
//!    provider of that capability. Self-edges are dropped (a module may read
//!    and write the same property) and duplicate edges collapse.
//!
//! A required capability with no provider adds no edge and is not an error
//! here. Whether capability names are real properties is a separate check,
//! [`check_capabilities`].
//!
//! ## Ordering
//!
//! Kahn's algorithm with a sorted ready set: whenever several modules are
//! free to go next, the lexicographically smallest name wins. The result
//! depends only on the declared dependencies, never on discovery order.
//!
//! If some modules can never become ready, the sort reports a
//! [`DependencyError`] naming the modules that sit on a cycle, one concrete
//! traced cycle path, and any modules blocked only because they depend on the
//! cycle.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use mimic_core::{DiagnosticsReport, ErrorClass, LocatedModule, ModuleDefinition, PropertySet};

/// The module graph contains a cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("circular dependency: {}", .path.join(" → "))]
pub struct DependencyError {
    /// Modules on at least one cycle, sorted.
    pub members: Vec<String>,
    /// One traced cycle, first node repeated at the end: `[a, b, a]`.
    pub path: Vec<String>,
    /// Modules that are not on a cycle but depend on one, sorted.
    pub blocked: Vec<String>,
}

/// Module dependency graph derived from `requires`/`provides`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    provides_map: BTreeMap<String, Vec<String>>,
    /// Module → providers it must run after.
    depends_on: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Build the graph from module definitions.
    pub fn build<'a>(modules: impl IntoIterator<Item = &'a ModuleDefinition>) -> Self {
        let modules: Vec<&ModuleDefinition> = modules.into_iter().collect();
        let mut graph = Self::default();

        for module in &modules {
            graph.nodes.insert(module.name.clone());
            for capability in &module.dependencies.provides {
                let providers = graph.provides_map.entry(capability.clone()).or_default();
                if !providers.contains(&module.name) {
                    providers.push(module.name.clone());
                }
            }
        }

        for module in &modules {
            let edges = graph.depends_on.entry(module.name.clone()).or_default();
            for capability in &module.dependencies.requires {
                let Some(providers) = graph.provides_map.get(capability) else {
                    tracing::debug!(
                        module = %module.name,
                        capability = %capability,
                        "required capability has no provider"
                    );
                    continue;
                };
                for provider in providers {
                    if provider != &module.name {
                        edges.insert(provider.clone());
                    }
                }
            }
        }

        graph
    }

    /// Modules advertising `capability`, in input order.
    pub fn providers(&self, capability: &str) -> &[String] {
        self.provides_map
            .get(capability)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Providers `module` must run after.
    pub fn dependencies_of(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.depends_on.get(module)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deterministic topological order of module names.
    pub fn topological_order(&self) -> Result<Vec<String>, DependencyError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for node in &self.nodes {
            let deps = self.depends_on.get(node).map_or(0, BTreeSet::len);
            in_degree.insert(node.as_str(), deps);
        }
        for (module, providers) in &self.depends_on {
            for provider in providers {
                dependents.entry(provider.as_str()).or_default().push(module.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(next) = ready.pop_first() {
            order.push(next.to_string());
            for dependent in dependents.get(next).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        let unresolved: BTreeSet<&str> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg > 0)
            .map(|(name, _)| *name)
            .collect();
        let members: Vec<String> = unresolved
            .iter()
            .filter(|name| self.reaches_itself(name, &unresolved))
            .map(|name| name.to_string())
            .collect();
        let blocked = unresolved
            .iter()
            .filter(|name| !members.iter().any(|m| m.as_str() == **name))
            .map(|name| name.to_string())
            .collect();
        let path = self.trace_cycle(&members);

        Err(DependencyError {
            members,
            path,
            blocked,
        })
    }

    /// Whether `start` can reach itself through modules in `within`.
    fn reaches_itself(&self, start: &str, within: &BTreeSet<&str>) -> bool {
        let mut stack: Vec<&str> = self.next_within(start, within);
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        while let Some(node) = stack.pop() {
            if node == start {
                return true;
            }
            if seen.insert(node) {
                stack.extend(self.next_within(node, within));
            }
        }
        false
    }

    fn next_within<'g>(&'g self, node: &str, within: &BTreeSet<&str>) -> Vec<&'g str> {
        self.depends_on
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|n| within.contains(*n))
            .collect()
    }

    /// Walk from the smallest cycle member, always taking the smallest
    /// neighbour on a cycle, until a node repeats. Returns `[a, .., a]`.
    fn trace_cycle(&self, members: &[String]) -> Vec<String> {
        let Some(start) = members.first() else {
            return Vec::new();
        };
        let on_cycle: BTreeSet<&str> = members.iter().map(String::as_str).collect();
        let mut path: Vec<&str> = vec![start.as_str()];
        let mut current = start.as_str();

        while let Some(next) = self.next_within(current, &on_cycle).first().copied() {
            if let Some(pos) = path.iter().position(|n| *n == next) {
                let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(next.to_string());
                return cycle;
            }
            path.push(next);
            current = next;
        }
        path.into_iter().map(String::from).collect()
    }
}

/// Order located modules by their dependencies.
pub fn resolve_order(modules: &[LocatedModule]) -> Result<Vec<&LocatedModule>, DependencyError> {
    let graph = DependencyGraph::build(modules.iter().map(|m| &m.definition));
    let order = graph.topological_order()?;

    let by_name: BTreeMap<&str, &LocatedModule> = modules.iter().map(|m| (m.name(), m)).collect();
    let ordered: Vec<&LocatedModule> = order
        .iter()
        .filter_map(|name| by_name.get(name.as_str()).copied())
        .collect();

    tracing::debug!(order = ?order, "resolved module order");
    Ok(ordered)
}

/// Check that every capability name of every runtime module is a property.
///
/// Utility modules are exempt. Unknown names are dependency errors attributed
/// to the module.
pub fn check_capabilities(
    modules: &[LocatedModule],
    properties: &PropertySet,
    report: &mut DiagnosticsReport,
) {
    let known = properties.names();
    for module in modules.iter().filter(|m| !m.definition.is_utility) {
        let deps = &module.definition.dependencies;
        for capability in &deps.requires {
            if !known.contains(capability.as_str()) {
                report.error(
                    module.name(),
                    ErrorClass::Dependency,
                    format!("requires unknown property '{capability}'"),
                );
            }
        }
        for capability in &deps.provides {
            if !known.contains(capability.as_str()) {
                report.error(
                    module.name(),
                    ErrorClass::Dependency,
                    format!("provides unknown property '{capability}'"),
                );
            }
        }
        let modified: Vec<&String> = deps
            .requires
            .iter()
            .filter(|c| deps.provides.contains(c))
            .collect();
        if !modified.is_empty() {
            tracing::debug!(module = %module.name(), modified = ?modified, "module both reads and writes");
        }
    }
}
