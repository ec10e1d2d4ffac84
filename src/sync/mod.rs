//! Resolve-and-copy pipeline.
//!
//! [`SyncEngine::copy_packages`] resolves a descriptor against source
//! repositories and copies the result into destination repositories. Each step
//! shows up in the returned stream:
//!
//! 1. the descriptor is narrowed to the names selected by the filter (the
//!    caller's descriptor is not touched);
//! 2. the narrowed descriptor is resolved against the sources; if anything is
//!    discarded or missing, one `PackageConflict` / `PackageMissing` is emitted
//!    per name and the pipeline stops there;
//! 3. shared-resource conflicts among the selected packages are reported,
//!    without stopping;
//! 4. every destination that supports publishing gets one publishing session
//!    and one `PackageAdded`, `PackageUpdated` or `PackageUpToDate` per
//!    resolved package;
//! 5. every destination is refreshed;
//! 6. the narrowed descriptor is resolved again, against the destinations, and
//!    resolutions marked anchored are anchored where supported.
//!
//! A deployment failure ends the stream with an `Err`; results already
//! emitted stay committed.

use anyhow::Result;
use std::sync::Arc;

use crate::deploy::PackageDeployer;
use crate::descriptor::PackageDescriptor;
use crate::models::{NameFilter, PackageInfo};
use crate::operation::{OperationResult, OperationStream};
use crate::repository::RepositoryRef;
use crate::resolver::{PackageResolver, ResolutionResult, SharedResourceDetector};

mod session;

use session::PublishSession;

/// Collaborators of the copy pipeline.
#[derive(Clone)]
pub struct SyncEngine {
    resolver: Arc<dyn PackageResolver>,
    deployer: Arc<dyn PackageDeployer>,
    detector: Arc<dyn SharedResourceDetector>,
}

impl SyncEngine {
    /// Creates an engine from its collaborators.
    pub fn new(
        resolver: Arc<dyn PackageResolver>,
        deployer: Arc<dyn PackageDeployer>,
        detector: Arc<dyn SharedResourceDetector>,
    ) -> Self {
        Self {
            resolver,
            deployer,
            detector,
        }
    }

    /// The resolver used for every resolution pass.
    #[must_use]
    pub fn resolver(&self) -> &dyn PackageResolver {
        self.resolver.as_ref()
    }

    /// Resolves `descriptor` against `sources` and copies the selection into
    /// `destinations`. Nothing happens until the stream is advanced.
    #[must_use]
    pub fn copy_packages(
        &self,
        sources: &[RepositoryRef],
        destinations: &[RepositoryRef],
        descriptor: &PackageDescriptor,
        filter: &NameFilter,
    ) -> OperationStream<'static> {
        let engine = self.clone();
        let sources = sources.to_vec();
        let destinations = destinations.to_vec();
        let descriptor = descriptor.filtered(filter);
        OperationStream::deferred(move || engine.resolve_and_deploy(descriptor, sources, destinations))
    }

    fn resolve_and_deploy(
        self,
        descriptor: PackageDescriptor,
        sources: Vec<RepositoryRef>,
        destinations: Vec<RepositoryRef>,
    ) -> Result<OperationStream<'static>> {
        tracing::debug!(
            dependencies = descriptor.len(),
            sources = sources.len(),
            "Resolving packages against sources"
        );
        let resolution = self.resolver.resolve(&descriptor, &sources)?;
        if !resolution.is_success() {
            tracing::info!(
                discarded = resolution.discarded.len(),
                missing = resolution.missing.len(),
                "Resolution failed, nothing will be copied"
            );
            return Ok(resolution_failures(resolution));
        }

        let selected: Vec<PackageInfo> = resolution.selected_packages().cloned().collect();
        let conflicts: Vec<Result<OperationResult>> = self
            .detector
            .detect_conflicts(&selected)
            .into_iter()
            .map(|conflict| {
                tracing::warn!(
                    slot = %conflict.slot,
                    packages = conflict.packages.len(),
                    reserved = conflict.reserved,
                    "Shared resource conflict"
                );
                Ok(OperationResult::SharedResourceConflict {
                    slot: conflict.slot,
                    packages: conflict.packages,
                })
            })
            .collect();

        let mut stream = OperationStream::new(conflicts.into_iter());
        for destination in &destinations {
            if destination.as_publishing().is_none() {
                tracing::debug!(repository = destination.name(), "Skipping destination without publishing");
                continue;
            }
            stream = stream.chain(OperationStream::new(PublishSession::new(
                Arc::clone(destination),
                sources.clone(),
                Arc::clone(&self.deployer),
                resolution.successful.clone(),
            )));
        }

        Ok(stream.then(move || self.refresh_and_anchor(&descriptor, destinations)))
    }

    fn refresh_and_anchor(
        &self,
        descriptor: &PackageDescriptor,
        destinations: Vec<RepositoryRef>,
    ) -> Result<OperationStream<'static>> {
        for destination in &destinations {
            destination.refresh()?;
            tracing::debug!(repository = destination.name(), "Refreshed repository");
        }
        let resolution = self.resolver.resolve(descriptor, &destinations)?;
        Ok(anchor_stream(resolution, destinations))
    }
}

/// One `PackageConflict` per discarded name, then one `PackageMissing` per missing name.
pub(crate) fn resolution_failures(resolution: ResolutionResult) -> OperationStream<'static> {
    let conflicts = resolution.discarded.into_iter().map(OperationResult::PackageConflict);
    let missing = resolution.missing.into_iter().map(OperationResult::PackageMissing);
    OperationStream::new(conflicts.chain(missing).map(Ok))
}

/// Anchors, per destination that supports it, the instances it holds of every
/// resolution marked anchored. Each destination is handled when the stream
/// reaches it.
pub(crate) fn anchor_stream(
    resolution: ResolutionResult,
    destinations: Vec<RepositoryRef>,
) -> OperationStream<'static> {
    let resolution = Arc::new(resolution);
    destinations.into_iter().fold(OperationStream::empty(), |stream, destination| {
        let resolution = Arc::clone(&resolution);
        stream.chain(OperationStream::deferred(move || {
            let results = anchor_in(&destination, &resolution)?;
            Ok(OperationStream::new(results.into_iter().map(Ok)))
        }))
    })
}

fn anchor_in(destination: &RepositoryRef, resolution: &ResolutionResult) -> Result<Vec<OperationResult>> {
    let Some(anchoring) = destination.as_anchoring() else {
        return Ok(Vec::new());
    };
    let targets: Vec<PackageInfo> = resolution
        .successful
        .iter()
        .filter(|resolved| resolved.anchored)
        .flat_map(|resolved| resolved.packages.iter().filter(|p| p.source == destination.name()))
        .cloned()
        .collect();
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    tracing::debug!(repository = destination.name(), packages = targets.len(), "Anchoring packages");
    anchoring.anchor_packages(&targets)
}
