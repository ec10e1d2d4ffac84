//! Fixpoint resolver over repository package indexes.

use anyhow::Result;
use std::collections::HashMap;

use super::{DependencyGraph, PackageResolver, ResolutionResult, ResolvedPackage};
use crate::constants::MAX_RESOLUTION_PASSES;
use crate::descriptor::{PackageDependency, PackageDescriptor};
use crate::models::{PackageIdentifier, PackageInfo, name_key};
use crate::repository::{PackageIndex, RepositoryRef};
use crate::version::Version;

/// Resolver that follows declared package dependencies until the selection
/// stops changing.
///
/// Per name, every requirement must be satisfiable on its own (otherwise the
/// name is *missing*) and all of them together (otherwise it is
/// *discarded*). Among the instances satisfying everything the highest
/// version wins; anchoring never holds a name back, so an anchored
/// dependency moves its pin when a newer version is deployed.
#[derive(Debug, Clone)]
pub struct DefaultResolver {
    max_passes: usize,
}

impl Default for DefaultResolver {
    fn default() -> Self {
        Self {
            max_passes: MAX_RESOLUTION_PASSES,
        }
    }
}

impl DefaultResolver {
    /// Creates a resolver with the default pass limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the maximum number of resolution passes.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }
}

enum Outcome {
    Selected {
        version: Version,
        packages: Vec<PackageInfo>,
    },
    Discarded,
    Missing,
}

struct NameState {
    name: String,
    requirements: Vec<PackageDependency>,
    outcome: Outcome,
}

/// Requirements per name, in discovery order.
struct Requirements {
    order: Vec<String>,
    by_name: HashMap<String, Vec<PackageDependency>>,
}

impl Requirements {
    fn collect(descriptor: &PackageDescriptor, selected: &HashMap<String, PackageInfo>) -> Self {
        let mut requirements = Self {
            order: Vec::new(),
            by_name: HashMap::new(),
        };
        for dependency in descriptor.dependencies() {
            requirements.push(dependency.clone());
        }

        let mut cursor = 0;
        while cursor < requirements.order.len() {
            let key = name_key(&requirements.order[cursor]);
            cursor += 1;
            let Some(package) = selected.get(&key) else {
                continue;
            };
            for dependency in &package.dependencies {
                if !dependency.has_name(&package.name) {
                    requirements.push(dependency.clone());
                }
            }
        }
        requirements
    }

    fn push(&mut self, dependency: PackageDependency) {
        let key = name_key(dependency.name());
        let entry = self.by_name.entry(key).or_default();
        if entry.is_empty() {
            self.order.push(dependency.name().to_string());
        }
        if !entry.contains(&dependency) {
            entry.push(dependency);
        }
    }
}

fn candidates(indexes: &[PackageIndex], name: &str) -> Vec<PackageInfo> {
    indexes.iter().flat_map(|index| index.get(name).iter().cloned()).collect()
}

fn evaluate(requirements: &[PackageDependency], candidates: &[PackageInfo]) -> Outcome {
    let individually_satisfiable = requirements
        .iter()
        .all(|requirement| candidates.iter().any(|c| requirement.is_satisfied_by(&c.version)));
    if !individually_satisfiable {
        return Outcome::Missing;
    }

    let joint: Vec<&PackageInfo> = candidates
        .iter()
        .filter(|c| requirements.iter().all(|r| r.is_satisfied_by(&c.version)))
        .collect();
    let Some(chosen) = joint.iter().max_by(|a, b| a.version.cmp(&b.version)) else {
        return Outcome::Discarded;
    };

    let version = chosen.version;
    Outcome::Selected {
        version,
        packages: joint.into_iter().filter(|c| c.version == version).cloned().collect(),
    }
}

fn selection_of(states: &[NameState]) -> HashMap<String, PackageInfo> {
    states
        .iter()
        .filter_map(|state| match &state.outcome {
            Outcome::Selected { packages, .. } => {
                packages.first().map(|p| (name_key(&state.name), p.clone()))
            }
            _ => None,
        })
        .collect()
}

fn same_selection(a: &HashMap<String, PackageInfo>, b: &HashMap<String, PackageInfo>) -> bool {
    a.len() == b.len()
        && a.iter().all(|(key, package)| b.get(key).is_some_and(|other| other.version == package.version))
}

fn dependencies_first(successful: Vec<ResolvedPackage>) -> Vec<ResolvedPackage> {
    let mut graph = DependencyGraph::new();
    for resolved in &successful {
        graph.add_package(resolved.name());
    }
    for resolved in &successful {
        let Some(package) = resolved.package() else {
            continue;
        };
        for dependency in &package.dependencies {
            if !dependency.has_name(resolved.name())
                && successful.iter().any(|r| r.identifier.has_name(dependency.name()))
            {
                graph.add_dependency(resolved.name(), dependency.name());
            }
        }
    }

    match graph.topological_order() {
        Ok(order) => {
            let mut remaining = successful;
            let mut ordered = Vec::with_capacity(remaining.len());
            for name in order {
                if let Some(index) = remaining.iter().position(|r| r.identifier.has_name(&name)) {
                    ordered.push(remaining.remove(index));
                }
            }
            ordered.extend(remaining);
            ordered
        }
        Err(e) => {
            tracing::debug!("Keeping discovery order: {e}");
            successful
        }
    }
}

impl PackageResolver for DefaultResolver {
    fn resolve(
        &self,
        descriptor: &PackageDescriptor,
        repositories: &[RepositoryRef],
    ) -> Result<ResolutionResult> {
        let indexes: Vec<PackageIndex> = repositories.iter().map(|r| r.packages_by_name()).collect();

        let mut selected = HashMap::new();
        let mut states = Vec::new();
        for pass in 1..=self.max_passes {
            let requirements = Requirements::collect(descriptor, &selected);
            states = requirements
                .order
                .iter()
                .map(|name| {
                    let reqs = requirements.by_name.get(&name_key(name)).cloned().unwrap_or_default();
                    let outcome = evaluate(&reqs, &candidates(&indexes, name));
                    NameState {
                        name: name.clone(),
                        requirements: reqs,
                        outcome,
                    }
                })
                .collect();

            let next = selection_of(&states);
            if same_selection(&selected, &next) {
                tracing::trace!(passes = pass, "Resolution reached a fixpoint");
                break;
            }
            if pass == self.max_passes {
                tracing::warn!(passes = pass, "Resolution did not stabilise, using last pass");
            }
            selected = next;
        }

        let mut result = ResolutionResult::default();
        let mut successful = Vec::new();
        for state in states {
            let anchored = state.requirements.iter().any(PackageDependency::is_anchored);
            match state.outcome {
                Outcome::Selected { version, packages } => successful.push(ResolvedPackage {
                    identifier: PackageIdentifier::new(state.name, Some(version)),
                    packages,
                    anchored,
                    requirements: state.requirements,
                }),
                Outcome::Discarded => result.discarded.push(ResolvedPackage {
                    identifier: PackageIdentifier::new(state.name, None),
                    packages: Vec::new(),
                    anchored,
                    requirements: state.requirements,
                }),
                Outcome::Missing => result.missing.push(ResolvedPackage {
                    identifier: PackageIdentifier::new(state.name, None),
                    packages: Vec::new(),
                    anchored,
                    requirements: state.requirements,
                }),
            }
        }
        result.successful = dependencies_first(successful);

        tracing::debug!(
            successful = result.successful.len(),
            discarded = result.discarded.len(),
            missing = result.missing.len(),
            repositories = repositories.len(),
            "Resolved descriptor"
        );
        Ok(result)
    }
}
