//! Package descriptors: the declared dependency list of a project.
//!
//! A [`PackageDescriptor`] is an ordered list of [`PackageDependency`] entries
//! keyed by name. Names are compared case-insensitively and the descriptor
//! never holds two entries with the same name: [`PackageDescriptor::upsert`]
//! replaces, [`PackageDescriptor::remove`] drops.
//!
//! Descriptors are plain values. Operations that only need a descriptor for a
//! single package synthesise one and never touch the caller's project
//! descriptor.
//!
//! # Text form
//!
//! Each dependency has a one-line text form (see [`dependency_spec`]):
//!
//! ```text
//! sauron >= 2.0 and < 3.0 anchored
//! frodo = 1.0.0 content
//! gandalf
//! ```
//!
//! and descriptor files are TOML (see [`io`]):
//!
//! ```toml
//! name = "shire"
//! depends = ["sauron >= 2.0", "frodo = 1.0.0 content"]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::NameFilter;
use crate::version::{ConstraintSet, Version, VersionVertex};

pub mod dependency_spec;
pub mod io;

/// How a descriptor edit changed the dependency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DescriptorUpdate {
    /// A new entry was appended.
    Added,
    /// An existing entry with the same name was replaced.
    Updated,
    /// An existing entry was dropped.
    Removed,
    /// The entry to remove does not exist.
    NotFound,
}

impl fmt::Display for DescriptorUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::NotFound => "not found",
        };
        f.write_str(text)
    }
}

/// A named, version-constrained dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageDependency {
    name: String,
    constraints: ConstraintSet,
    anchored: bool,
    content_only: bool,
}

impl PackageDependency {
    /// Creates a dependency on `name` with no constraint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: ConstraintSet::new(),
            anchored: false,
            content_only: false,
        }
    }

    /// Adds one vertex.
    #[must_use]
    pub fn with_vertex(mut self, vertex: VersionVertex) -> Self {
        self.constraints.push(vertex);
        self
    }

    /// Adds several vertices.
    #[must_use]
    pub fn with_vertices(mut self, vertices: impl IntoIterator<Item = VersionVertex>) -> Self {
        for vertex in vertices {
            self.constraints.push(vertex);
        }
        self
    }

    /// Marks the dependency as anchored.
    #[must_use]
    pub const fn anchored(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    /// Marks the dependency as content-only.
    #[must_use]
    pub const fn content_only(mut self, content_only: bool) -> Self {
        self.content_only = content_only;
        self
    }

    /// Dependency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constraints a candidate must satisfy.
    #[must_use]
    pub const fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Whether the resolution should be pinned.
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Whether the dependency contributes files only.
    #[must_use]
    pub const fn is_content_only(&self) -> bool {
        self.content_only
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether `version` satisfies every constraint.
    #[must_use]
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.constraints.satisfies(version)
    }
}

/// An ordered, name-unique list of dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDescriptor {
    name: Option<String>,
    dependencies: Vec<PackageDependency>,
}

impl PackageDescriptor {
    /// Creates an anonymous, empty descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            dependencies: Vec::new(),
        }
    }

    /// Creates an empty descriptor with a project name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            dependencies: Vec::new(),
        }
    }

    /// Creates a descriptor holding a single dependency.
    #[must_use]
    pub fn single(dependency: PackageDependency) -> Self {
        Self {
            name: None,
            dependencies: vec![dependency],
        }
    }

    /// Adds a dependency, replacing any entry with the same name, builder style.
    #[must_use]
    pub fn with_dependency(mut self, dependency: PackageDependency) -> Self {
        self.upsert(dependency);
        self
    }

    /// Project name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Dependencies in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }

    /// Looks a dependency up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageDependency> {
        self.dependencies.iter().find(|d| d.has_name(name))
    }

    /// Whether a dependency with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes any entry with the dependency's name, then appends the dependency.
    ///
    /// Returns [`DescriptorUpdate::Updated`] when an entry was replaced and
    /// [`DescriptorUpdate::Added`] otherwise.
    pub fn upsert(&mut self, dependency: PackageDependency) -> DescriptorUpdate {
        let before = self.dependencies.len();
        self.dependencies.retain(|d| !d.has_name(dependency.name()));
        let update = if self.dependencies.len() < before {
            DescriptorUpdate::Updated
        } else {
            DescriptorUpdate::Added
        };
        self.dependencies.push(dependency);
        update
    }

    /// Removes the entry named `name`, returning it.
    pub fn remove(&mut self, name: &str) -> Option<PackageDependency> {
        let index = self.dependencies.iter().position(|d| d.has_name(name))?;
        Some(self.dependencies.remove(index))
    }

    /// A copy holding only the dependencies selected by `filter`.
    #[must_use]
    pub fn filtered(&self, filter: &NameFilter) -> Self {
        Self {
            name: self.name.clone(),
            dependencies: self
                .dependencies
                .iter()
                .filter(|d| filter.matches(d.name()))
                .cloned()
                .collect(),
        }
    }

    /// Number of dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Whether there are no dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}
