//! Common test utilities for packsync integration tests
//!
//! Every test works against in-memory repositories: a `system` repository
//! acting as the package source and a `project` repository as destination.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::Result;
use std::sync::Arc;

use packsync::descriptor::{PackageDependency, PackageDescriptor};
use packsync::hooks::HookRegistry;
use packsync::manager::{AddOptions, CleanOptions, PackageManager, RemoveOptions, UpdateOptions};
use packsync::models::{NameFilter, PackageRequest};
use packsync::operation::OperationResult;
use packsync::repository::RepositoryRef;
use packsync::test_utils::{MemoryRepository, init_test_logging};

/// A system repository, a project repository and a project descriptor.
pub struct TestEnvironment {
    pub system: MemoryRepository,
    pub project: MemoryRepository,
    pub descriptor: PackageDescriptor,
    pub manager: PackageManager,
}

impl TestEnvironment {
    /// Empty repositories, an empty descriptor and a manager without hooks.
    pub fn new() -> Self {
        init_test_logging(None);
        Self {
            system: MemoryRepository::new("system"),
            project: MemoryRepository::new("project"),
            descriptor: PackageDescriptor::named("test-project"),
            manager: PackageManager::new(),
        }
    }

    /// Adds a package to the system repository.
    pub fn with_system_package(mut self, name: &str, version: &str) -> Self {
        self.system = self.system.with_package(name, version);
        self
    }

    /// Adds a package to the project repository.
    pub fn with_project_package(mut self, name: &str, version: &str) -> Self {
        self.project = self.project.with_package(name, version);
        self
    }

    /// Declares a project dependency, e.g. `sauron >= 2.0`.
    pub fn with_dependency(mut self, line: &str) -> Self {
        let dependency = PackageDependency::parse(line).expect("valid dependency line");
        self.descriptor.upsert(dependency);
        self
    }

    /// Rebuilds the manager with `hooks` installed.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.manager = PackageManager::builder().hooks(hooks).build();
        self
    }

    /// The system repository as a source list.
    pub fn sources(&self) -> Vec<RepositoryRef> {
        vec![self.system_ref()]
    }

    pub fn system_ref(&self) -> RepositoryRef {
        Arc::new(self.system.clone())
    }

    pub fn project_ref(&self) -> RepositoryRef {
        Arc::new(self.project.clone())
    }

    /// Adds a project package and drains the stream.
    pub fn add(&mut self, request: &PackageRequest, options: AddOptions) -> Result<Vec<OperationResult>> {
        let sources = self.sources();
        let project = self.project_ref();
        self.manager
            .add_project_package(request, &sources, &mut self.descriptor, &project, options)?
            .collect_all()
    }

    /// Updates project packages and drains the stream.
    pub fn update(&self, filter: &NameFilter) -> Result<Vec<OperationResult>> {
        self.manager
            .update_project_packages(
                &self.sources(),
                &self.project_ref(),
                &self.descriptor,
                filter,
                UpdateOptions::default(),
            )?
            .collect_all()
    }

    /// Removes a project package and drains the stream.
    pub fn remove(&mut self, request: &PackageRequest, options: RemoveOptions) -> Result<Vec<OperationResult>> {
        let project = self.project_ref();
        self.manager
            .remove_project_package(request, &mut self.descriptor, &project, options)?
            .collect_all()
    }

    /// Cleans the project repository and drains the stream.
    pub fn clean(&self, filter: &NameFilter) -> Result<Vec<OperationResult>> {
        self.manager
            .clean_project_packages(&self.descriptor, &self.project_ref(), filter, CleanOptions::default())?
            .collect_all()
    }
}

/// Names of the results, for compact assertions.
pub fn kinds(results: &[OperationResult]) -> Vec<&'static str> {
    results
        .iter()
        .map(|result| match result {
            OperationResult::DescriptorUpdated { .. } => "descriptor-updated",
            OperationResult::PackageAdded { .. } => "added",
            OperationResult::PackageUpdated { .. } => "updated",
            OperationResult::PackageUpToDate { .. } => "up-to-date",
            OperationResult::PackageConflict(_) => "conflict",
            OperationResult::PackageMissing(_) => "missing",
            OperationResult::SharedResourceConflict { .. } => "shared-resource-conflict",
            OperationResult::PackageAnchored { .. } => "anchored",
            OperationResult::PackageCleaned { .. } => "cleaned",
            OperationResult::PackageFound(_) => "found",
            OperationResult::HookOutput(_) => "hook-output",
            OperationResult::CleanCannotDo { .. } => "clean-cannot-do",
        })
        .collect()
}
