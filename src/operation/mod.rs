//! Operation results and lazy result streams.
//!
//! Every public operation returns an [`OperationStream`]: an iterator of
//! `Result<OperationResult>` that performs no work until it is advanced. Each
//! side effect (descriptor edit, deployment, refresh, anchoring, hook call)
//! happens while the element reporting it is produced, so a stream dropped
//! half way has applied exactly the effects of the elements already returned.
//! Nothing is rolled back.
//!
//! Recoverable outcomes are [`OperationResult`] values; check
//! [`OperationResult::is_success`] or drain the stream with
//! [`OperationStream::summary`]. Only exceptional failures (missing
//! capability, I/O, deployment, hooks) surface as `Err`, after which the
//! stream ends.

use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::iter::FusedIterator;

use crate::descriptor::DescriptorUpdate;
use crate::models::PackageInfo;
use crate::resolver::ResolvedPackage;

/// One outcome reported by an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// The project descriptor was edited, or the entry to remove was absent.
    DescriptorUpdated {
        /// Dependency name.
        name: String,
        /// What happened to the entry.
        update: DescriptorUpdate,
    },
    /// A package was deployed to a repository that held no version of it.
    PackageAdded {
        /// The deployed instance.
        package: PackageInfo,
        /// Destination repository.
        repository: String,
    },
    /// A newer version was deployed over an older one.
    PackageUpdated {
        /// Newest instance held before the deployment.
        from: PackageInfo,
        /// The deployed instance.
        to: PackageInfo,
        /// Destination repository.
        repository: String,
    },
    /// The destination already holds the resolved version or newer.
    PackageUpToDate {
        /// Newest instance held by the destination.
        package: PackageInfo,
        /// Destination repository.
        repository: String,
    },
    /// Requirements on a package cannot be satisfied together.
    PackageConflict(ResolvedPackage),
    /// No repository holds a satisfying version.
    PackageMissing(ResolvedPackage),
    /// Several packages claim the same process-wide slot.
    SharedResourceConflict {
        /// Slot name.
        slot: String,
        /// Claiming packages.
        packages: Vec<PackageInfo>,
    },
    /// A repository pinned a package instance.
    PackageAnchored {
        /// The pinned instance.
        package: PackageInfo,
        /// Repository holding it.
        repository: String,
    },
    /// A repository deleted a package instance.
    PackageCleaned {
        /// The deleted instance.
        package: PackageInfo,
        /// Repository it was deleted from.
        repository: String,
    },
    /// A package matched a list query.
    PackageFound(PackageInfo),
    /// Output returned by a lifecycle hook.
    HookOutput(Value),
    /// Cleaning was refused because nothing resolved.
    CleanCannotDo {
        /// Repository that was to be cleaned.
        repository: String,
    },
}

impl OperationResult {
    /// Whether the result reports a successful outcome.
    ///
    /// Shared-resource conflicts are informational and count as success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Self::DescriptorUpdated {
                update: DescriptorUpdate::NotFound,
                ..
            } | Self::PackageConflict(_)
                | Self::PackageMissing(_)
                | Self::CleanCannotDo { .. }
        )
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DescriptorUpdated { name, update } => write!(f, "Descriptor entry '{name}' {update}"),
            Self::PackageAdded { package, repository } => {
                write!(f, "Added {} to {repository}", package.full_name())
            }
            Self::PackageUpdated {
                from,
                to,
                repository,
            } => write!(f, "Updated {} from {} to {} in {repository}", to.name, from.version, to.version),
            Self::PackageUpToDate { package, repository } => {
                write!(f, "{} is up to date in {repository}", package.full_name())
            }
            Self::PackageConflict(resolved) => write!(f, "Conflicting requirements for {resolved}"),
            Self::PackageMissing(resolved) => write!(f, "No package satisfies {resolved}"),
            Self::SharedResourceConflict { slot, packages } => {
                let names: Vec<String> = packages.iter().map(PackageInfo::full_name).collect();
                write!(f, "Shared slot '{slot}' is claimed by {}", names.join(", "))
            }
            Self::PackageAnchored { package, repository } => {
                write!(f, "Anchored {} in {repository}", package.full_name())
            }
            Self::PackageCleaned { package, repository } => {
                write!(f, "Removed {} from {repository}", package.full_name())
            }
            Self::PackageFound(package) => write!(f, "{package}"),
            Self::HookOutput(value) => write!(f, "{value}"),
            Self::CleanCannotDo { repository } => {
                write!(f, "Cannot clean {repository}: no package could be resolved")
            }
        }
    }
}

/// Counts of each outcome kind in a drained stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSummary {
    /// Total number of results.
    pub total: usize,
    /// Results for which [`OperationResult::is_success`] is false.
    pub failures: usize,
    /// `PackageAdded` results.
    pub added: usize,
    /// `PackageUpdated` results.
    pub updated: usize,
    /// `PackageUpToDate` results.
    pub up_to_date: usize,
    /// `PackageCleaned` results.
    pub cleaned: usize,
    /// `PackageAnchored` results.
    pub anchored: usize,
    /// `HookOutput` results.
    pub hook_outputs: usize,
}

impl OperationSummary {
    /// Accounts for one result.
    pub fn record(&mut self, result: &OperationResult) {
        self.total += 1;
        if !result.is_success() {
            self.failures += 1;
        }
        match result {
            OperationResult::PackageAdded { .. } => self.added += 1,
            OperationResult::PackageUpdated { .. } => self.updated += 1,
            OperationResult::PackageUpToDate { .. } => self.up_to_date += 1,
            OperationResult::PackageCleaned { .. } => self.cleaned += 1,
            OperationResult::PackageAnchored { .. } => self.anchored += 1,
            OperationResult::HookOutput(_) => self.hook_outputs += 1,
            _ => {}
        }
    }

    /// Whether every result succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures == 0
    }
}

/// Lazy stream of operation results.
///
/// Fused: after the first `Err` (or the end) it only yields `None`.
pub struct OperationStream<'a> {
    inner: Option<Box<dyn Iterator<Item = Result<OperationResult>> + 'a>>,
}

impl<'a> OperationStream<'a> {
    /// Wraps an iterator.
    pub fn new(iter: impl Iterator<Item = Result<OperationResult>> + 'a) -> Self {
        Self {
            inner: Some(Box::new(iter)),
        }
    }

    /// A stream with no results.
    #[must_use]
    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// A stream yielding one result.
    #[must_use]
    pub fn once(result: OperationResult) -> Self {
        Self::new(std::iter::once(Ok(result)))
    }

    /// A stream whose construction is deferred until it is first advanced.
    ///
    /// An `Err` from `build` is yielded as the single element.
    pub fn deferred(build: impl FnOnce() -> Result<OperationStream<'a>> + 'a) -> Self {
        let mut build = Some(build);
        let mut stream: Option<OperationStream<'a>> = None;
        Self::new(std::iter::from_fn(move || {
            if let Some(build) = build.take() {
                match build() {
                    Ok(built) => stream = Some(built),
                    Err(e) => return Some(Err(e)),
                }
            }
            stream.as_mut()?.next()
        }))
    }

    /// Appends another stream.
    #[must_use]
    pub fn chain(self, next: OperationStream<'a>) -> Self {
        Self::new(self.chain_inner(next))
    }

    fn chain_inner(self, next: OperationStream<'a>) -> impl Iterator<Item = Result<OperationResult>> + 'a {
        let mut first = self;
        let mut second = next;
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            let item = first.next().or_else(|| second.next());
            if matches!(item, Some(Err(_))) {
                failed = true;
            }
            item
        })
    }

    /// Appends a stream built only after this one is exhausted without error.
    #[must_use]
    pub fn then(self, next: impl FnOnce() -> Result<OperationStream<'a>> + 'a) -> Self {
        self.chain(Self::deferred(next))
    }

    /// Drains the stream into a vector, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream produced; results produced before it
    /// have already taken effect.
    pub fn collect_all(self) -> Result<Vec<OperationResult>> {
        self.collect()
    }

    /// Drains the stream into an [`OperationSummary`].
    ///
    /// # Errors
    ///
    /// Returns the first error the stream produced.
    pub fn summary(self) -> Result<OperationSummary> {
        let mut summary = OperationSummary::default();
        for result in self {
            summary.record(&result?);
        }
        Ok(summary)
    }
}

impl Iterator for OperationStream<'_> {
    type Item = Result<OperationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        match inner.next() {
            Some(Ok(result)) => Some(Ok(result)),
            Some(Err(e)) => {
                self.inner = None;
                Some(Err(e))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}

impl FusedIterator for OperationStream<'_> {}

impl fmt::Debug for OperationStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationStream").field("finished", &self.inner.is_none()).finish()
    }
}
