//! Removing packages.
//!
//! A request without a specific version removes the project dependency; a
//! request for an exact or the last version deletes package files instead and
//! leaves the descriptor alone.

use anyhow::Result;

use super::clean::{clean_project, clean_to};
use super::{PackageManager, RemoveOptions};
use crate::descriptor::{DescriptorUpdate, PackageDescriptor};
use crate::hooks::HookScope;
use crate::models::{NameFilter, PackageInfo, PackageRequest};
use crate::operation::{OperationResult, OperationStream};
use crate::repository::{RepositoryRef, require_cleaning};
use crate::version::Version;

impl PackageManager {
    /// Removes a package from the project.
    ///
    /// Without a specific version the dependency is dropped from `descriptor`
    /// when the first result is produced, reported as
    /// [`DescriptorUpdate::Removed`], or [`DescriptorUpdate::NotFound`] (which
    /// ends the stream) when absent. With [`RemoveOptions::clean`] the project
    /// is then cleaned for that name.
    ///
    /// With an exact or last version, that version's files are deleted from
    /// `project`.
    ///
    /// # Errors
    ///
    /// Returns an error before any work if the request is invalid or the
    /// removal needs cleaning and `project` cannot be cleaned.
    pub fn remove_project_package<'a>(
        &self,
        request: &PackageRequest,
        descriptor: &'a mut PackageDescriptor,
        project: &RepositoryRef,
        options: RemoveOptions,
    ) -> Result<OperationStream<'a>> {
        request.validate()?;
        let before = self.project_snapshot(descriptor.clone(), project);

        if request.targets_specific_version() {
            require_cleaning(project.as_ref())?;
            tracing::debug!(package = %request, project = project.name(), "Removing project package files");
            let after = self.project_snapshot(descriptor.clone(), project);
            let removal = remove_files(RepositoryRef::clone(project), request.clone());
            return Ok(self.hooked(options.hooks, HookScope::Project, project, removal, before, after));
        }

        if options.clean {
            require_cleaning(project.as_ref())?;
        }
        let mut remaining = descriptor.clone();
        remaining.remove(request.name());
        let after = self.project_snapshot(remaining.clone(), project);

        let name = request.name().to_string();
        let engine = self.engine.clone();
        let repository = RepositoryRef::clone(project);
        let clean = options.clean;
        tracing::debug!(package = %name, clean, "Removing project dependency");
        let removal = OperationStream::deferred(move || {
            if descriptor.remove(&name).is_none() {
                tracing::info!(package = %name, "Dependency not declared");
                return Ok(OperationStream::once(OperationResult::DescriptorUpdated {
                    name,
                    update: DescriptorUpdate::NotFound,
                }));
            }
            let filter = NameFilter::Exact(name.clone());
            let removed = OperationStream::once(OperationResult::DescriptorUpdated {
                name,
                update: DescriptorUpdate::Removed,
            });
            if !clean {
                return Ok(removed);
            }
            Ok(removed.chain(clean_project(engine, repository, descriptor.clone(), filter)))
        });
        Ok(self.hooked(options.hooks, HookScope::Project, project, removal, before, after))
    }

    /// Deletes system package files.
    ///
    /// An exact version deletes that version, the last-version flag deletes
    /// the newest held version, and a bare name deletes every version.
    ///
    /// # Errors
    ///
    /// Returns an error before any work if the request is invalid or `system`
    /// cannot be cleaned.
    pub fn remove_system_package(
        &self,
        request: &PackageRequest,
        system: &RepositoryRef,
        options: RemoveOptions,
    ) -> Result<OperationStream<'static>> {
        request.validate()?;
        require_cleaning(system.as_ref())?;
        tracing::debug!(package = %request, system = system.name(), "Removing system package");
        let removal = remove_files(RepositoryRef::clone(system), request.clone());
        Ok(self.hooked(
            options.hooks,
            HookScope::System,
            system,
            removal,
            Self::system_snapshot(system),
            Self::system_snapshot(system),
        ))
    }
}

/// Cleans `repository` to everything except the version `request` targets.
fn remove_files(repository: RepositoryRef, request: PackageRequest) -> OperationStream<'static> {
    OperationStream::deferred(move || {
        let index = repository.packages_by_name();
        let target: Option<Version> = if request.is_last_version() {
            index.latest(request.name()).map(|p| p.version)
        } else {
            request.exact_version().copied()
        };
        if request.is_last_version() && target.is_none() {
            tracing::debug!(package = request.name(), "Nothing held, nothing to remove");
            return Ok(OperationStream::empty());
        }
        let keep: Vec<PackageInfo> = index
            .packages()
            .filter(|p| !(p.has_name(request.name()) && target.is_none_or(|v| p.version == v)))
            .cloned()
            .collect();
        clean_to(&repository, &keep)
    })
}
