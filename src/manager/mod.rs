//! Package manager façade.
//!
//! [`PackageManager`] exposes the add, update, remove, clean and list
//! operations for the two scopes:
//!
//! - **project**: a project repository driven by a [`PackageDescriptor`]
//! - **system**: a system repository with no descriptor, where every held
//!   package is implicitly wanted
//!
//! Every operation checks its preconditions (request validity, repository
//! capabilities, list query syntax) when it is called and returns an error
//! before doing anything. The returned [`OperationStream`] then performs one
//! unit of work per advanced result; dropping it early leaves the work done so
//! far committed.
//!
//! ```rust,no_run
//! use packsync::manager::{AddOptions, PackageManager};
//! use packsync::descriptor::PackageDescriptor;
//! use packsync::models::PackageRequest;
//! # use packsync::repository::RepositoryRef;
//! # fn example(system: RepositoryRef, project: RepositoryRef) -> anyhow::Result<()> {
//! let manager = PackageManager::new();
//! let mut descriptor = PackageDescriptor::named("my-project");
//!
//! let summary = manager
//!     .add_project_package(
//!         &PackageRequest::any("sauron"),
//!         &[system],
//!         &mut descriptor,
//!         &project,
//!         AddOptions::default(),
//!     )?
//!     .summary()?;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::slice;
use std::sync::Arc;

use crate::config::ManagerConfig;
use crate::deploy::{PackageDeployer, PublishingDeployer};
use crate::descriptor::PackageDescriptor;
use crate::hooks::{HookRegistry, HookScope, HookedStream, Snapshot};
use crate::models::PackageInfo;
use crate::operation::OperationStream;
use crate::repository::RepositoryRef;
use crate::resolver::{DefaultResolver, PackageResolver, SharedResourceDetector, SlotConflictDetector};
use crate::sync::SyncEngine;

mod add;
mod clean;
mod list;
mod options;
mod remove;
mod update;

pub use options::{AddOptions, CleanOptions, ListOptions, RemoveOptions, UpdateOptions};

/// Entry point for package operations.
///
/// Collaborators are injected through [`PackageManagerBuilder`];
/// [`PackageManager::new`] wires the default ones.
#[derive(Clone)]
pub struct PackageManager {
    engine: SyncEngine,
    hooks: Option<Arc<HookRegistry>>,
    config: ManagerConfig,
}

impl Default for PackageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager {
    /// A manager with the default resolver, deployer and conflict detector,
    /// no hooks and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> PackageManagerBuilder {
        PackageManagerBuilder::default()
    }

    /// Default add options from the configuration.
    #[must_use]
    pub const fn add_options(&self) -> AddOptions {
        self.config.add
    }

    /// Default update options from the configuration.
    #[must_use]
    pub const fn update_options(&self) -> UpdateOptions {
        self.config.update
    }

    /// Default remove options from the configuration.
    #[must_use]
    pub const fn remove_options(&self) -> RemoveOptions {
        self.config.remove
    }

    /// Default clean options from the configuration.
    #[must_use]
    pub const fn clean_options(&self) -> CleanOptions {
        self.config.clean
    }

    /// The registered hooks, if any.
    #[must_use]
    pub fn hooks(&self) -> Option<&HookRegistry> {
        self.hooks.as_deref()
    }

    /// Wraps `base` so the hooks of `scope` fire once it succeeded.
    ///
    /// Returns `base` untouched when hooks are disabled for the call or none
    /// are registered for the scope.
    fn hooked<'a>(
        &self,
        enabled: bool,
        scope: HookScope,
        repository: &RepositoryRef,
        base: OperationStream<'a>,
        before: Snapshot<'a>,
        after: Snapshot<'a>,
    ) -> OperationStream<'a> {
        match &self.hooks {
            Some(registry) if enabled && registry.has_hooks_for(scope) => HookedStream::new(
                base,
                Arc::clone(registry),
                scope,
                repository.name(),
                before,
                after,
            )
            .into_stream(),
            _ => base,
        }
    }

    /// Packages `descriptor` resolves to in `project`, taken when called.
    fn project_snapshot(&self, descriptor: PackageDescriptor, project: &RepositoryRef) -> Snapshot<'static> {
        let engine = self.engine.clone();
        let project = Arc::clone(project);
        Box::new(move || {
            let resolution = engine.resolver().resolve(&descriptor, slice::from_ref(&project))?;
            Ok(resolution.selected_packages().cloned().collect())
        })
    }

    /// Newest instance of every package held by `system`, taken when called.
    fn system_snapshot(system: &RepositoryRef) -> Snapshot<'static> {
        let system = Arc::clone(system);
        Box::new(move || {
            let packages: Vec<PackageInfo> = system.packages_by_name().latest_packages().cloned().collect();
            Ok(packages)
        })
    }
}

impl fmt::Debug for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageManager")
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PackageManager`].
#[derive(Default)]
pub struct PackageManagerBuilder {
    resolver: Option<Arc<dyn PackageResolver>>,
    deployer: Option<Arc<dyn PackageDeployer>>,
    detector: Option<Arc<dyn SharedResourceDetector>>,
    hooks: Option<Arc<HookRegistry>>,
    config: ManagerConfig,
}

impl PackageManagerBuilder {
    /// Sets the resolver. Defaults to [`DefaultResolver`].
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn PackageResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the deployer. Defaults to [`PublishingDeployer`].
    #[must_use]
    pub fn deployer(mut self, deployer: Arc<dyn PackageDeployer>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    /// Sets the shared-resource detector. Defaults to [`SlotConflictDetector`].
    #[must_use]
    pub fn detector(mut self, detector: Arc<dyn SharedResourceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Installs lifecycle hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Some(Arc::new(hooks));
        self
    }

    /// Installs the option defaults returned by
    /// [`PackageManager::add_options`] and friends.
    #[must_use]
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the manager.
    #[must_use]
    pub fn build(self) -> PackageManager {
        let resolver = self.resolver.unwrap_or_else(|| Arc::new(DefaultResolver::new()));
        let deployer = self.deployer.unwrap_or_else(|| Arc::new(PublishingDeployer));
        let detector = self.detector.unwrap_or_else(|| Arc::new(SlotConflictDetector::new()));
        PackageManager {
            engine: SyncEngine::new(resolver, deployer, detector),
            hooks: self.hooks,
            config: self.config,
        }
    }
}
