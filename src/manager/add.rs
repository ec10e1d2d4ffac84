//! Adding packages to the project or system repository.

use anyhow::Result;
use std::slice;

use super::{AddOptions, PackageManager};
use crate::descriptor::{PackageDependency, PackageDescriptor};
use crate::hooks::HookScope;
use crate::models::{NameFilter, PackageRequest};
use crate::operation::{OperationResult, OperationStream};
use crate::repository::RepositoryRef;

/// The descriptor entry a request turns into.
fn to_dependency(request: &PackageRequest, options: AddOptions) -> PackageDependency {
    PackageDependency::new(request.name())
        .with_vertices(request.to_vertices())
        .anchored(options.anchor)
        .content_only(options.content)
}

impl PackageManager {
    /// Adds (or re-constrains) a project dependency and copies the package
    /// into `project`.
    ///
    /// Any entry for the same name is replaced. The first result reports the
    /// descriptor edit; it is written back into `descriptor` at that point
    /// unless [`AddOptions::update_descriptor`] is off. The copy only touches
    /// the requested name, resolved with the whole edited descriptor's entry
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns an error before any work if the request is invalid.
    pub fn add_project_package<'a>(
        &self,
        request: &PackageRequest,
        sources: &[RepositoryRef],
        descriptor: &'a mut PackageDescriptor,
        project: &RepositoryRef,
        options: AddOptions,
    ) -> Result<OperationStream<'a>> {
        request.validate()?;

        let original = descriptor.clone();
        let mut edited = descriptor.clone();
        let update = edited.upsert(to_dependency(request, options));
        let name = request.name().to_string();
        tracing::debug!(package = %request, %update, project = project.name(), "Adding project package");

        let copy = self.engine.copy_packages(
            sources,
            slice::from_ref(project),
            &edited,
            &NameFilter::Exact(name.clone()),
        );
        let before = self.project_snapshot(original, project);
        let after = self.project_snapshot(edited.clone(), project);

        let commit = options.update_descriptor;
        let edit = OperationStream::deferred(move || {
            if commit {
                *descriptor = edited;
            }
            Ok(OperationStream::once(OperationResult::DescriptorUpdated { name, update }))
        });

        Ok(self.hooked(options.hooks, HookScope::Project, project, edit.chain(copy), before, after))
    }

    /// Copies the requested package into the system repository.
    ///
    /// # Errors
    ///
    /// Returns an error before any work if the request is invalid.
    pub fn add_system_package(
        &self,
        request: &PackageRequest,
        sources: &[RepositoryRef],
        system: &RepositoryRef,
        options: AddOptions,
    ) -> Result<OperationStream<'static>> {
        request.validate()?;
        tracing::debug!(package = %request, system = system.name(), "Adding system package");

        let descriptor = PackageDescriptor::single(to_dependency(request, options));
        let copy = self
            .engine
            .copy_packages(sources, slice::from_ref(system), &descriptor, &NameFilter::All);
        Ok(self.hooked(
            options.hooks,
            HookScope::System,
            system,
            copy,
            Self::system_snapshot(system),
            Self::system_snapshot(system),
        ))
    }
}
