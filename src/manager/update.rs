//! Updating packages already held.

use anyhow::Result;
use std::slice;

use super::{PackageManager, UpdateOptions};
use crate::descriptor::{PackageDependency, PackageDescriptor};
use crate::hooks::HookScope;
use crate::models::{NameFilter, PackageInfo};
use crate::operation::{OperationResult, OperationStream};
use crate::repository::RepositoryRef;
use crate::sync::SyncEngine;
use crate::version::VersionVertex;

impl PackageManager {
    /// Re-runs the copy for the project descriptor, narrowed to `filter`.
    ///
    /// # Errors
    ///
    /// Currently infallible at call time; the signature matches the other
    /// operations.
    pub fn update_project_packages(
        &self,
        sources: &[RepositoryRef],
        project: &RepositoryRef,
        descriptor: &PackageDescriptor,
        filter: &NameFilter,
        options: UpdateOptions,
    ) -> Result<OperationStream<'static>> {
        tracing::debug!(%filter, project = project.name(), "Updating project packages");
        let copy = self
            .engine
            .copy_packages(sources, slice::from_ref(project), descriptor, filter);
        Ok(self.hooked(
            options.hooks,
            HookScope::Project,
            project,
            copy,
            self.project_snapshot(descriptor.clone(), project),
            self.project_snapshot(descriptor.clone(), project),
        ))
    }

    /// Upgrades every system package selected by `filter` to its newest
    /// version available from `sources`.
    ///
    /// Each held name is copied on its own with an
    /// [`UpdateFrom`](VersionVertex::UpdateFrom) constraint on its newest held
    /// version. A name some source hosts, but not in a newer version, is
    /// reported up to date; a name no source hosts is reported missing.
    ///
    /// # Errors
    ///
    /// Currently infallible at call time; the signature matches the other
    /// operations.
    pub fn update_system_packages(
        &self,
        sources: &[RepositoryRef],
        system: &RepositoryRef,
        filter: &NameFilter,
        options: UpdateOptions,
    ) -> Result<OperationStream<'static>> {
        tracing::debug!(%filter, system = system.name(), "Updating system packages");
        let engine = self.engine.clone();
        let sources = sources.to_vec();
        let destination = RepositoryRef::clone(system);
        let filter = filter.clone();
        let updates = OperationStream::deferred(move || {
            let held: Vec<PackageInfo> = destination
                .packages_by_name()
                .latest_packages()
                .filter(|p| filter.matches(&p.name))
                .cloned()
                .collect();
            tracing::debug!(packages = held.len(), "Checking system packages for updates");
            Ok(held.into_iter().fold(OperationStream::empty(), |stream, current| {
                stream.chain(update_one(&engine, &sources, &destination, current))
            }))
        });
        Ok(self.hooked(
            options.hooks,
            HookScope::System,
            system,
            updates,
            Self::system_snapshot(system),
            Self::system_snapshot(system),
        ))
    }
}

/// Copies the newest upgrade of `current` into `destination`.
fn update_one(
    engine: &SyncEngine,
    sources: &[RepositoryRef],
    destination: &RepositoryRef,
    current: PackageInfo,
) -> OperationStream<'static> {
    let descriptor = PackageDescriptor::single(
        PackageDependency::new(current.name.clone()).with_vertex(VersionVertex::UpdateFrom(current.version)),
    );
    let repository = destination.name().to_string();
    let hosts = sources.to_vec();
    let copy = engine.copy_packages(sources, slice::from_ref(destination), &descriptor, &NameFilter::All);
    // a source hosting the name but nothing newer means there is nothing to update
    OperationStream::new(copy.map(move |result| match result {
        Ok(OperationResult::PackageMissing(resolved))
            if resolved.identifier.has_name(&current.name)
                && hosts.iter().any(|source| source.packages_by_name().contains_name(&current.name)) =>
        {
            tracing::debug!(package = %current.full_name(), "No newer version available");
            Ok(OperationResult::PackageUpToDate {
                package: current.clone(),
                repository: repository.clone(),
            })
        }
        other => other,
    }))
}
