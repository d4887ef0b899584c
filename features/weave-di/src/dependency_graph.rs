use std::{
    any::TypeId,
    collections::{BTreeMap, HashSet},
};

use thiserror::Error;

use crate::{errors::UnresolvedComponent, resolver::Parameter, types::TypeInfo};

/// Graph of the components which could not be constructed
///
/// Edges are the missing constructor parameters. A missing parameter either
/// names another unresolved component, or nothing that could ever provide it.
/// Used to explain why resolution failed.
pub struct DependencyGraph {
    map: BTreeMap<TypeId, DependencyGraphEntry>,
}
impl DependencyGraph {
    pub fn new(unresolved: &[UnresolvedComponent]) -> Self {
        let mut graph = Self {
            map: Default::default(),
        };

        for component in unresolved {
            graph.add(component.component, component.missing.clone());
        }

        graph
    }

    pub fn add(&mut self, info: TypeInfo, dependencies: Vec<Parameter>) {
        self.map
            .insert(info.type_id, DependencyGraphEntry { info, dependencies });
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.map.values() {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                entry,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            checked: &mut HashSet<TypeId>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<TypeInfo>,
            entry: &DependencyGraphEntry,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|info| *info == entry.info) {
                let mut chain = dependency_chain[start..].to_vec();
                chain.push(entry.info);

                errors.push(DependencyGraphError::CircularDependency {
                    from: chain[0],
                    to: chain[chain.len() - 2],
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(entry.info.type_id) {
                return;
            };

            dependency_chain.push(entry.info);

            for dependency in &entry.dependencies {
                let Some(next_entry) = graph.map.get(&dependency.type_info.type_id) else {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: dependency.type_info,
                        parameter: dependency.name,
                        required_by: entry.info,
                    });

                    continue;
                };

                check_recurse(graph, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }
}

struct DependencyGraphEntry {
    info: TypeInfo,
    dependencies: Vec<Parameter>,
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency} {parameter}' but nothing registers or provides it")]
    MissingDependency {
        dependency: TypeInfo,
        parameter: &'static str,
        required_by: TypeInfo,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CircularDependency {
        from: TypeInfo,
        to: TypeInfo,
        chain: Vec<TypeInfo>,
    },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
