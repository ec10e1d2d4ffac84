//! Deleting package versions that are no longer needed.

use anyhow::Result;
use std::slice;

use super::{CleanOptions, PackageManager};
use crate::descriptor::PackageDescriptor;
use crate::hooks::HookScope;
use crate::models::{NameFilter, PackageInfo};
use crate::operation::{OperationResult, OperationStream};
use crate::repository::{RepositoryRef, require_cleaning};
use crate::sync::{SyncEngine, anchor_stream};

impl PackageManager {
    /// Deletes project package versions the descriptor no longer resolves to.
    ///
    /// Only names selected by `filter` are touched. If the descriptor resolves
    /// to nothing at all in `project`, a single
    /// [`OperationResult::CleanCannotDo`] is emitted and nothing is deleted.
    /// Surviving anchored resolutions are anchored again afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::MissingCapability`](crate::core::PackageError::MissingCapability)
    /// if `project` cannot be cleaned.
    pub fn clean_project_packages(
        &self,
        descriptor: &PackageDescriptor,
        project: &RepositoryRef,
        filter: &NameFilter,
        options: CleanOptions,
    ) -> Result<OperationStream<'static>> {
        require_cleaning(project.as_ref())?;
        let clean = clean_project(
            self.engine.clone(),
            RepositoryRef::clone(project),
            descriptor.clone(),
            filter.clone(),
        );
        Ok(self.hooked(
            options.hooks,
            HookScope::Project,
            project,
            clean,
            self.project_snapshot(descriptor.clone(), project),
            self.project_snapshot(descriptor.clone(), project),
        ))
    }

    /// Keeps only the newest version of every system package selected by
    /// `filter`. Other names are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::MissingCapability`](crate::core::PackageError::MissingCapability)
    /// if `system` cannot be cleaned.
    pub fn clean_system_packages(
        &self,
        system: &RepositoryRef,
        filter: &NameFilter,
        options: CleanOptions,
    ) -> Result<OperationStream<'static>> {
        require_cleaning(system.as_ref())?;
        let repository = RepositoryRef::clone(system);
        let filter = filter.clone();
        let clean = OperationStream::deferred(move || {
            let index = repository.packages_by_name();
            let keep: Vec<PackageInfo> = index
                .iter()
                .flat_map(|versions| {
                    let selected = versions.first().is_some_and(|p| filter.matches(&p.name));
                    let skip = if selected { versions.len().saturating_sub(1) } else { 0 };
                    versions[skip..].iter().cloned()
                })
                .collect();
            clean_to(&repository, &keep)
        });
        Ok(self.hooked(
            options.hooks,
            HookScope::System,
            system,
            clean,
            Self::system_snapshot(system),
            Self::system_snapshot(system),
        ))
    }
}

/// Cleans `project` down to what `descriptor` resolves to, within `filter`.
pub(super) fn clean_project(
    engine: SyncEngine,
    project: RepositoryRef,
    descriptor: PackageDescriptor,
    filter: NameFilter,
) -> OperationStream<'static> {
    OperationStream::deferred(move || {
        let resolution = engine.resolver().resolve(&descriptor, slice::from_ref(&project))?;
        if resolution.successful.is_empty() {
            tracing::info!(repository = project.name(), "Nothing resolved, refusing to clean");
            return Ok(OperationStream::once(OperationResult::CleanCannotDo {
                repository: project.name().to_string(),
            }));
        }

        let in_use = resolution
            .successful
            .iter()
            .flat_map(|resolved| resolved.packages.iter())
            .filter(|p| filter.matches(&p.name));
        let index = project.packages_by_name();
        let untouched = index.packages().filter(|p| !filter.matches(&p.name));
        let keep: Vec<PackageInfo> = in_use.chain(untouched).cloned().collect();

        let cleaned = clean_to(&project, &keep)?;
        Ok(cleaned.chain(anchor_stream(resolution, vec![project])))
    })
}

/// Cleans `repository` to `keep`, reporting every deleted instance.
pub(super) fn clean_to(repository: &RepositoryRef, keep: &[PackageInfo]) -> Result<OperationStream<'static>> {
    tracing::debug!(repository = repository.name(), keep = keep.len(), "Cleaning repository");
    let results: Vec<OperationResult> = require_cleaning(repository.as_ref())?.clean(keep)?;
    Ok(OperationStream::new(results.into_iter().map(Ok)))
}
