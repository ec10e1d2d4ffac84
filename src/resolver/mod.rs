//! Dependency resolution.
//!
//! A [`PackageResolver`] turns a [`PackageDescriptor`] and an ordered list of
//! repositories into a [`ResolutionResult`]. The pipeline treats it as a pure
//! function of its inputs.
//!
//! [`DefaultResolver`] is the implementation used by [`crate::manager::PackageManager`]
//! unless another one is injected.

use anyhow::Result;
use std::fmt;

use crate::descriptor::{PackageDependency, PackageDescriptor};
use crate::models::{PackageIdentifier, PackageInfo};
use crate::repository::RepositoryRef;

mod default;
pub mod dependency_graph;
pub mod shared_resource;

pub use default::DefaultResolver;
pub use dependency_graph::DependencyGraph;
pub use shared_resource::{SharedResourceConflict, SharedResourceDetector, SlotConflictDetector};

/// Resolves descriptors against repositories.
pub trait PackageResolver: Send + Sync {
    /// Chooses a concrete version for every dependency of `descriptor`.
    fn resolve(
        &self,
        descriptor: &PackageDescriptor,
        repositories: &[RepositoryRef],
    ) -> Result<ResolutionResult>;
}

/// Outcome of resolving one package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Name and, for successful resolutions, the chosen version.
    pub identifier: PackageIdentifier,
    /// Instances of the chosen version across the input repositories, in
    /// repository order. Never empty for a successful resolution.
    pub packages: Vec<PackageInfo>,
    /// Whether any requirement asked for the resolution to be pinned.
    pub anchored: bool,
    /// Requirements that applied to this name.
    pub requirements: Vec<PackageDependency>,
}

impl ResolvedPackage {
    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identifier.name
    }

    /// First candidate instance.
    #[must_use]
    pub fn package(&self) -> Option<&PackageInfo> {
        self.packages.first()
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if !self.requirements.is_empty() {
            let requirements: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", requirements.join("; "))?;
        }
        Ok(())
    }
}

/// Successful, discarded and missing resolutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Resolved packages, dependencies before dependents.
    pub successful: Vec<ResolvedPackage>,
    /// Names whose requirements cannot be satisfied together.
    pub discarded: Vec<ResolvedPackage>,
    /// Names for which no repository has a satisfying version.
    pub missing: Vec<ResolvedPackage>,
}

impl ResolutionResult {
    /// Whether nothing was discarded or missing.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.discarded.is_empty() && self.missing.is_empty()
    }

    /// Looks a successful resolution up by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ResolvedPackage> {
        self.successful.iter().find(|r| r.identifier.has_name(name))
    }

    /// First instance of every successful resolution.
    pub fn selected_packages(&self) -> impl Iterator<Item = &PackageInfo> {
        self.successful.iter().filter_map(ResolvedPackage::package)
    }
}
