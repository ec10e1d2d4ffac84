//! In-memory repository with every optional capability.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::PackageError;
use crate::descriptor::PackageDependency;
use crate::models::PackageInfo;
use crate::operation::OperationResult;
use crate::repository::{
    PackageIndex, PackagePublisher, PackageRepository, SupportsAnchoring, SupportsCleaning,
    SupportsPublishing,
};
use crate::version::Version;

/// Package content as stored by [`MemoryRepository`]: a TOML manifest, so the
/// declared dependencies and slots survive a copy between repositories.
#[derive(Debug, Serialize, Deserialize)]
struct PackageManifest {
    name: String,
    version: Version,
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl PackageManifest {
    fn from_info(package: &PackageInfo) -> Self {
        Self {
            name: package.name.clone(),
            version: package.version,
            depends: package.dependencies.iter().map(ToString::to_string).collect(),
            slots: package.shared_slots.clone(),
            description: package.description.clone(),
        }
    }

    fn into_info(self, source: &str) -> Result<PackageInfo> {
        let mut package = PackageInfo::new(self.name, self.version, source);
        for line in &self.depends {
            package.dependencies.push(PackageDependency::parse(line)?);
        }
        package.shared_slots = self.slots;
        package.description = self.description;
        Ok(package)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    stored: Vec<PackageInfo>,
    published_files: Vec<String>,
    index: PackageIndex,
    session_open: bool,
    sessions_opened: usize,
    sessions_closed: usize,
    refreshes: usize,
    fail_reads: bool,
    fail_publish: bool,
}

impl MemoryState {
    fn rebuild_index(&mut self) {
        self.index = self.stored.iter().cloned().collect();
    }

    fn store(&mut self, package: PackageInfo) {
        self.stored.retain(|p| !p.same_package(&package));
        self.stored.push(package);
    }
}

/// A repository held in memory.
///
/// Packages added through the builder methods are visible immediately.
/// Packages written through a publishing session only show up in
/// [`PackageRepository::packages_by_name`] after
/// [`PackageRepository::refresh`]; cleaning and anchoring refresh on their own.
/// Clones share the same store.
#[derive(Clone)]
pub struct MemoryRepository {
    name: String,
    state: Arc<Mutex<MemoryState>>,
    cleaning: bool,
    publishing: bool,
    anchoring: bool,
}

impl MemoryRepository {
    /// Creates an empty repository supporting every capability.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MemoryState::default())),
            cleaning: true,
            publishing: true,
            anchoring: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn parse_version(version: &str) -> Version {
        Version::parse(version).unwrap_or_else(|e| panic!("invalid test version '{version}': {e}"))
    }

    /// Adds a package instance with no dependencies.
    #[must_use]
    pub fn with_package(self, name: &str, version: &str) -> Self {
        let package = PackageInfo::new(name, Self::parse_version(version), self.name.clone());
        self.with_info(package)
    }

    /// Adds an anchored package instance.
    #[must_use]
    pub fn with_anchored_package(self, name: &str, version: &str) -> Self {
        let mut package = PackageInfo::new(name, Self::parse_version(version), self.name.clone());
        package.anchored = true;
        self.with_info(package)
    }

    /// Adds a fully described package instance; its source is set to this repository.
    #[must_use]
    pub fn with_info(self, mut package: PackageInfo) -> Self {
        package.source = self.name.clone();
        {
            let mut state = self.lock();
            state.store(package);
            state.rebuild_index();
        }
        self
    }

    /// Turns the cleaning capability off.
    #[must_use]
    pub const fn without_cleaning(mut self) -> Self {
        self.cleaning = false;
        self
    }

    /// Turns the publishing capability off.
    #[must_use]
    pub const fn without_publishing(mut self) -> Self {
        self.publishing = false;
        self
    }

    /// Turns the anchoring capability off.
    #[must_use]
    pub const fn without_anchoring(mut self) -> Self {
        self.anchoring = false;
        self
    }

    /// Makes every content read fail.
    #[must_use]
    pub fn failing_reads(self) -> Self {
        self.lock().fail_reads = true;
        self
    }

    /// Makes every publish fail.
    #[must_use]
    pub fn failing_publish(self) -> Self {
        self.lock().fail_publish = true;
        self
    }

    /// Whether the backing store holds `name` at exactly `version`.
    #[must_use]
    pub fn has_package(&self, name: &str, version: &str) -> bool {
        let version = Self::parse_version(version);
        self.lock().stored.iter().any(|p| p.has_name(name) && p.version == version)
    }

    /// Versions of `name` in the backing store, ascending.
    #[must_use]
    pub fn versions(&self, name: &str) -> Vec<String> {
        let mut versions: Vec<Version> =
            self.lock().stored.iter().filter(|p| p.has_name(name)).map(|p| p.version).collect();
        versions.sort();
        versions.into_iter().map(|v| v.to_string()).collect()
    }

    /// Number of package instances in the backing store.
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.lock().stored.len()
    }

    /// Whether `name` at `version` is anchored.
    #[must_use]
    pub fn is_anchored(&self, name: &str, version: &str) -> bool {
        let version = Self::parse_version(version);
        self.lock().stored.iter().any(|p| p.has_name(name) && p.version == version && p.anchored)
    }

    /// File names written through publishing sessions.
    #[must_use]
    pub fn published_files(&self) -> Vec<String> {
        self.lock().published_files.clone()
    }

    /// Number of publishing sessions opened.
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    /// Number of publishing sessions released.
    #[must_use]
    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    /// Number of explicit refreshes.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.lock().refreshes
    }
}

impl fmt::Debug for MemoryRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("name", &self.name)
            .field("packages", &self.package_count())
            .finish_non_exhaustive()
    }
}

impl PackageRepository for MemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn packages_by_name(&self) -> PackageIndex {
        self.lock().index.clone()
    }

    fn refresh(&self) -> Result<()> {
        let mut state = self.lock();
        state.rebuild_index();
        state.refreshes += 1;
        Ok(())
    }

    fn open_package(&self, package: &PackageInfo) -> Result<Vec<u8>> {
        let state = self.lock();
        let not_found = || PackageError::PackageContentNotFound {
            name: package.name.clone(),
            version: package.version.to_string(),
            repository: self.name.clone(),
        };
        if state.fail_reads {
            return Err(not_found().into());
        }
        let stored = state.stored.iter().find(|p| p.same_package(package)).ok_or_else(not_found)?;
        let manifest = toml::to_string(&PackageManifest::from_info(stored)).map_err(PackageError::from)?;
        Ok(manifest.into_bytes())
    }

    fn as_cleaning(&self) -> Option<&dyn SupportsCleaning> {
        self.cleaning.then_some(self as &dyn SupportsCleaning)
    }

    fn as_publishing(&self) -> Option<&dyn SupportsPublishing> {
        self.publishing.then_some(self as &dyn SupportsPublishing)
    }

    fn as_anchoring(&self) -> Option<&dyn SupportsAnchoring> {
        self.anchoring.then_some(self as &dyn SupportsAnchoring)
    }
}

impl SupportsCleaning for MemoryRepository {
    fn clean(&self, keep: &[PackageInfo]) -> Result<Vec<OperationResult>> {
        let mut state = self.lock();
        let (kept, removed): (Vec<PackageInfo>, Vec<PackageInfo>) = std::mem::take(&mut state.stored)
            .into_iter()
            .partition(|p| keep.iter().any(|k| k.same_package(p)));
        state.stored = kept;
        state.rebuild_index();
        Ok(removed
            .into_iter()
            .map(|package| OperationResult::PackageCleaned {
                package,
                repository: self.name.clone(),
            })
            .collect())
    }
}

impl SupportsAnchoring for MemoryRepository {
    fn anchor_packages(&self, packages: &[PackageInfo]) -> Result<Vec<OperationResult>> {
        let mut state = self.lock();
        let mut results = Vec::new();
        for target in packages {
            if !state.stored.iter().any(|p| p.same_package(target)) {
                return Err(anyhow!("Cannot anchor {}: not held by '{}'", target.full_name(), self.name));
            }
            for stored in state.stored.iter_mut().filter(|p| p.has_name(&target.name)) {
                let pin = stored.version == target.version;
                if pin && !stored.anchored {
                    results.push(OperationResult::PackageAnchored {
                        package: stored.clone(),
                        repository: self.name.clone(),
                    });
                }
                stored.anchored = pin;
            }
        }
        state.rebuild_index();
        Ok(results)
    }
}

impl SupportsPublishing for MemoryRepository {
    fn publisher(&self) -> Result<Box<dyn PackagePublisher>> {
        let mut state = self.lock();
        if state.session_open {
            return Err(anyhow!("Repository '{}' already has an open publishing session", self.name));
        }
        state.session_open = true;
        state.sessions_opened += 1;
        Ok(Box::new(MemoryPublisher {
            repository: self.name.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

/// Publishing session over a [`MemoryRepository`]; released on drop.
struct MemoryPublisher {
    repository: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPublisher {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PackagePublisher for MemoryPublisher {
    fn publish(&mut self, file_name: &str, content: &[u8]) -> Result<PackageInfo> {
        if self.lock().fail_publish {
            return Err(anyhow!("Repository '{}' refused {file_name}", self.repository));
        }
        let text = std::str::from_utf8(content)?;
        let manifest: PackageManifest = toml::from_str(text).map_err(PackageError::from)?;
        let package = manifest.into_info(&self.repository)?;

        let mut state = self.lock();
        state.store(package.clone());
        state.published_files.push(file_name.to_string());
        Ok(package)
    }
}

impl Drop for MemoryPublisher {
    fn drop(&mut self) {
        let mut state = self.lock();
        state.session_open = false;
        state.sessions_closed += 1;
    }
}
