//! Shared data models for packsync operations
//!
//! These types flow between the manager, the resolver and the repositories:
//!
//! - [`PackageRequest`] - what a caller asks to add or remove
//! - [`PackageIdentifier`] - a name (compared case-insensitively) plus an optional version
//! - [`PackageInfo`] - one concrete package instance held by a repository
//! - [`NameFilter`] - the "all packages" / "exactly this name" selector

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use crate::core::PackageError;
use crate::descriptor::PackageDependency;
use crate::version::{Version, VersionVertex};

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("package name pattern is valid")
});

/// Validates a package name.
///
/// # Errors
///
/// Returns [`PackageError::InvalidPackageName`] if the name is empty or contains
/// characters outside `[A-Za-z0-9._-]`.
pub fn validate_package_name(name: &str) -> Result<()> {
    if PACKAGE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(PackageError::InvalidPackageName {
            name: name.to_string(),
        }
        .into())
    }
}

/// Lower-cased key used wherever package names are compared.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// A request to add or remove a package.
///
/// Exactly one version selector is meaningful at a time: an exact version,
/// a `[min, max)` range (either bound optional), the "last version" flag, or
/// nothing at all, which means "latest acceptable".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageRequest {
    name: String,
    exact_version: Option<Version>,
    min_version: Option<Version>,
    max_version: Option<Version>,
    last_version: bool,
}

impl PackageRequest {
    /// Requests any version of `name`.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Requests exactly `version` of `name`.
    pub fn exact(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            exact_version: Some(version),
            ..Self::default()
        }
    }

    /// Requests the newest held version of `name` (used by removal).
    pub fn last(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_version: true,
            ..Self::default()
        }
    }

    /// Requests a version of `name` in `[min, max)`.
    pub fn between(name: impl Into<String>, min: Version, max: Version) -> Self {
        Self::any(name).with_min(min).with_max(max)
    }

    /// Sets an inclusive lower bound.
    #[must_use]
    pub const fn with_min(mut self, min: Version) -> Self {
        self.min_version = Some(min);
        self
    }

    /// Sets an exclusive upper bound.
    #[must_use]
    pub const fn with_max(mut self, max: Version) -> Self {
        self.max_version = Some(max);
        self
    }

    /// Requested package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact version, if requested.
    #[must_use]
    pub const fn exact_version(&self) -> Option<&Version> {
        self.exact_version.as_ref()
    }

    /// Inclusive lower bound, if requested.
    #[must_use]
    pub const fn min_version(&self) -> Option<&Version> {
        self.min_version.as_ref()
    }

    /// Exclusive upper bound, if requested.
    #[must_use]
    pub const fn max_version(&self) -> Option<&Version> {
        self.max_version.as_ref()
    }

    /// Whether the newest held version is targeted.
    #[must_use]
    pub const fn is_last_version(&self) -> bool {
        self.last_version
    }

    /// Whether the request targets specific files rather than a dependency entry.
    #[must_use]
    pub const fn targets_specific_version(&self) -> bool {
        self.exact_version.is_some() || self.last_version
    }

    /// Checks the name and that only one version selector is in use.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidPackageName`] or [`PackageError::InvalidRequest`].
    pub fn validate(&self) -> Result<()> {
        validate_package_name(&self.name)?;
        let has_range = self.min_version.is_some() || self.max_version.is_some();
        let reject = |reason: &str| -> Result<()> {
            Err(PackageError::InvalidRequest {
                name: self.name.clone(),
                reason: reason.to_string(),
            }
            .into())
        };
        if self.exact_version.is_some() && (has_range || self.last_version) {
            return reject("an exact version cannot be combined with other version selectors");
        }
        if self.last_version && has_range {
            return reject("the last-version flag cannot be combined with a version range");
        }
        if let (Some(min), Some(max)) = (&self.min_version, &self.max_version)
            && min >= max
        {
            return reject(&format!("minimum version {min} is not below maximum {max}"));
        }
        Ok(())
    }

    /// Translates the request into the vertices a dependency must satisfy.
    ///
    /// Exact, min and max each contribute a vertex; with none of them set the
    /// result is a single [`VersionVertex::Any`].
    #[must_use]
    pub fn to_vertices(&self) -> Vec<VersionVertex> {
        let mut vertices = Vec::new();
        if let Some(exact) = self.exact_version {
            vertices.push(VersionVertex::Equal(exact));
        }
        if let Some(min) = self.min_version {
            vertices.push(VersionVertex::GreaterOrEqual(min));
        }
        if let Some(max) = self.max_version {
            vertices.push(VersionVertex::LessThan(max));
        }
        if vertices.is_empty() {
            vertices.push(VersionVertex::Any);
        }
        vertices
    }
}

impl fmt::Display for PackageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(exact) = &self.exact_version {
            write!(f, " = {exact}")?;
        }
        if let Some(min) = &self.min_version {
            write!(f, " >= {min}")?;
        }
        if let Some(max) = &self.max_version {
            write!(f, " < {max}")?;
        }
        if self.last_version {
            write!(f, " (last)")?;
        }
        Ok(())
    }
}

/// A package name with an optional version.
///
/// Equality and hashing ignore ASCII case in the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageIdentifier {
    /// Package name as originally spelled.
    pub name: String,
    /// Version, `None` when the identifier names a package without a resolved version.
    pub version: Option<Version>,
}

impl PackageIdentifier {
    /// Creates an identifier.
    pub fn new(name: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for PackageIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.has_name(&other.name) && self.version == other.version
    }
}

impl Eq for PackageIdentifier {}

impl Hash for PackageIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        name_key(&self.name).hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}-{version}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A concrete package instance held by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name as spelled by the repository.
    pub name: String,
    /// Package version.
    pub version: Version,
    /// Name of the repository holding this instance.
    pub source: String,
    /// Whether the repository has pinned this instance.
    pub anchored: bool,
    /// Dependencies declared by the package itself.
    pub dependencies: Vec<PackageDependency>,
    /// Process-wide load slots the package claims when loaded.
    pub shared_slots: Vec<String>,
    /// Free-form description.
    pub description: Option<String>,
}

impl PackageInfo {
    /// Creates an instance with no dependencies, slots or description.
    pub fn new(name: impl Into<String>, version: Version, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            source: source.into(),
            anchored: false,
            dependencies: Vec::new(),
            shared_slots: Vec::new(),
            description: None,
        }
    }

    /// Adds a declared dependency.
    #[must_use]
    pub fn with_dependency(mut self, dependency: PackageDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Adds a claimed load slot.
    #[must_use]
    pub fn with_shared_slot(mut self, slot: impl Into<String>) -> Self {
        self.shared_slots.push(slot.into());
        self
    }

    /// Identifier (`name`, `Some(version)`) of this instance.
    #[must_use]
    pub fn identifier(&self) -> PackageIdentifier {
        PackageIdentifier::new(self.name.clone(), Some(self.version))
    }

    /// `name-version`, the conventional display and file stem.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this instance is the same package version as `other`, ignoring source.
    #[must_use]
    pub fn same_package(&self, other: &Self) -> bool {
        self.has_name(&other.name) && self.version == other.version
    }
}

impl fmt::Display for PackageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.name, self.version, self.source)
    }
}

/// Selects which package names an operation touches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NameFilter {
    /// Every package.
    #[default]
    All,
    /// Only the package with this name (case-insensitive).
    Exact(String),
}

impl NameFilter {
    /// Builds a filter from an optional name.
    pub fn from_option(name: Option<&str>) -> Self {
        name.map_or(Self::All, |n| Self::Exact(n.to_string()))
    }

    /// Whether `name` is selected.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(target) => target.eq_ignore_ascii_case(name),
        }
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Exact(name) => f.write_str(name),
        }
    }
}
