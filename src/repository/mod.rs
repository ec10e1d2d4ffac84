//! Repository abstraction.
//!
//! A repository is a named store of package instances. Every repository can
//! list its packages and hand out package content; the optional capabilities
//! are exposed through accessor methods rather than runtime casts:
//!
//! | Capability | Accessor | Used by |
//! |---|---|---|
//! | [`SupportsCleaning`] | [`PackageRepository::as_cleaning`] | remove, clean |
//! | [`SupportsPublishing`] | [`PackageRepository::as_publishing`] | add, update |
//! | [`SupportsAnchoring`] | [`PackageRepository::as_anchoring`] | add, update, clean |
//!
//! Operations check the capabilities they need when they are constructed and
//! fail with [`PackageError::MissingCapability`] before doing any work. The
//! `require_*` helpers do that check. Anchoring is never required:
//! repositories without it are simply not anchored.
//!
//! The package index returned by [`PackageRepository::packages_by_name`] is a
//! snapshot: writes made through a publishing session only become visible
//! after [`PackageRepository::refresh`].

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Capability, PackageError};
use crate::models::{PackageInfo, name_key};
use crate::operation::OperationResult;

/// Shared handle to a repository.
pub type RepositoryRef = Arc<dyn PackageRepository>;

/// A named store of package instances.
pub trait PackageRepository: Send + Sync {
    /// Repository name, used as [`PackageInfo::source`] and in messages.
    fn name(&self) -> &str;

    /// Snapshot of the package index.
    fn packages_by_name(&self) -> PackageIndex;

    /// Reloads the package index from the backing store.
    fn refresh(&self) -> Result<()>;

    /// Reads the content of a package hosted by this repository.
    fn open_package(&self, package: &PackageInfo) -> Result<Vec<u8>>;

    /// Cleaning capability, if supported.
    fn as_cleaning(&self) -> Option<&dyn SupportsCleaning> {
        None
    }

    /// Publishing capability, if supported.
    fn as_publishing(&self) -> Option<&dyn SupportsPublishing> {
        None
    }

    /// Anchoring capability, if supported.
    fn as_anchoring(&self) -> Option<&dyn SupportsAnchoring> {
        None
    }
}

/// Removal of package instances.
pub trait SupportsCleaning {
    /// Deletes every instance not listed in `keep`.
    ///
    /// Instances are matched by name (case-insensitive) and version. Emits
    /// one [`OperationResult::PackageCleaned`] per removed instance.
    fn clean(&self, keep: &[PackageInfo]) -> Result<Vec<OperationResult>>;
}

/// Writing package content.
pub trait SupportsPublishing {
    /// Opens an exclusive publishing session.
    ///
    /// The session is released when the returned value is dropped.
    fn publisher(&self) -> Result<Box<dyn PackagePublisher>>;
}

/// Pinning package instances.
pub trait SupportsAnchoring {
    /// Anchors the given instances, emitting one
    /// [`OperationResult::PackageAnchored`] per instance that changed.
    fn anchor_packages(&self, packages: &[PackageInfo]) -> Result<Vec<OperationResult>>;
}

/// An open publishing session.
pub trait PackagePublisher {
    /// Stores `content` under `file_name`, returning the published instance.
    fn publish(&mut self, file_name: &str, content: &[u8]) -> Result<PackageInfo>;
}

/// Returns the cleaning capability or a [`PackageError::MissingCapability`].
pub fn require_cleaning(repository: &dyn PackageRepository) -> Result<&dyn SupportsCleaning> {
    repository
        .as_cleaning()
        .ok_or_else(|| PackageError::missing_capability(repository.name(), Capability::Cleaning).into())
}

/// Returns the publishing capability or a [`PackageError::MissingCapability`].
pub fn require_publishing(repository: &dyn PackageRepository) -> Result<&dyn SupportsPublishing> {
    repository
        .as_publishing()
        .ok_or_else(|| PackageError::missing_capability(repository.name(), Capability::Publishing).into())
}

/// Package instances grouped by case-insensitive name.
///
/// Each group is sorted by ascending version and holds at most one instance
/// per version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    entries: BTreeMap<String, Vec<PackageInfo>>,
}

impl PackageIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Adds an instance, replacing any instance with the same version.
    pub fn insert(&mut self, package: PackageInfo) {
        let group = self.entries.entry(name_key(&package.name)).or_default();
        match group.binary_search_by(|p| p.version.cmp(&package.version)) {
            Ok(index) => group[index] = package,
            Err(index) => group.insert(index, package),
        }
    }

    /// All instances of `name`, oldest first.
    #[must_use]
    pub fn get(&self, name: &str) -> &[PackageInfo] {
        self.entries.get(&name_key(name)).map_or(&[], Vec::as_slice)
    }

    /// Newest instance of `name`.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<&PackageInfo> {
        self.get(name).last()
    }

    /// Whether any instance of `name` exists.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = &[PackageInfo]> {
        self.entries.values().map(Vec::as_slice)
    }

    /// Every instance, grouped by name then ordered by version.
    pub fn packages(&self) -> impl Iterator<Item = &PackageInfo> {
        self.entries.values().flatten()
    }

    /// Newest instance of every name.
    pub fn latest_packages(&self) -> impl Iterator<Item = &PackageInfo> {
        self.entries.values().filter_map(|group| group.last())
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PackageInfo> for PackageIndex {
    fn from_iter<I: IntoIterator<Item = PackageInfo>>(iter: I) -> Self {
        let mut index = Self::new();
        for package in iter {
            index.insert(package);
        }
        index
    }
}
