//! Per-destination publishing session.

use anyhow::Result;
use std::sync::Arc;

use crate::core::PackageError;
use crate::deploy::PackageDeployer;
use crate::models::PackageInfo;
use crate::operation::OperationResult;
use crate::repository::{PackageIndex, PackagePublisher, RepositoryRef, require_publishing};
use crate::resolver::ResolvedPackage;

/// Deploys resolved packages into one destination, one result per package.
///
/// The publisher is opened when the first package is processed and released
/// after the last one, on the first error, or when the session is dropped.
pub(crate) struct PublishSession {
    destination: RepositoryRef,
    sources: Vec<RepositoryRef>,
    deployer: Arc<dyn PackageDeployer>,
    pending: std::vec::IntoIter<ResolvedPackage>,
    state: SessionState,
}

enum SessionState {
    NotStarted,
    Open {
        publisher: Box<dyn PackagePublisher>,
        existing: PackageIndex,
        source_indexes: Vec<PackageIndex>,
    },
    Closed,
}

impl PublishSession {
    pub(crate) fn new(
        destination: RepositoryRef,
        sources: Vec<RepositoryRef>,
        deployer: Arc<dyn PackageDeployer>,
        packages: Vec<ResolvedPackage>,
    ) -> Self {
        Self {
            destination,
            sources,
            deployer,
            pending: packages.into_iter(),
            state: SessionState::NotStarted,
        }
    }

    fn open(&mut self) -> Result<()> {
        let publisher = require_publishing(self.destination.as_ref())?.publisher()?;
        tracing::debug!(repository = self.destination.name(), "Opened publishing session");
        self.state = SessionState::Open {
            publisher,
            existing: self.destination.packages_by_name(),
            source_indexes: self.sources.iter().map(|s| s.packages_by_name()).collect(),
        };
        Ok(())
    }

    fn close(&mut self) {
        if matches!(self.state, SessionState::Open { .. }) {
            tracing::debug!(repository = self.destination.name(), "Closed publishing session");
        }
        self.state = SessionState::Closed;
    }

    fn process(&mut self, resolved: &ResolvedPackage) -> Result<OperationResult> {
        let SessionState::Open {
            publisher,
            existing,
            source_indexes,
        } = &mut self.state
        else {
            return Err(anyhow::anyhow!("Publishing session is not open"));
        };
        let repository = self.destination.name().to_string();
        let name = resolved.name();
        let no_source = || PackageError::NoSourceForPackage {
            name: name.to_string(),
            version: resolved.identifier.version.map(|v| v.to_string()).unwrap_or_default(),
        };
        let version = resolved.identifier.version.ok_or_else(no_source)?;

        let held = existing.latest(name).cloned();
        if let Some(held) = &held
            && held.version >= version
        {
            tracing::debug!(package = %held.full_name(), repository = %repository, "Already up to date");
            return Ok(OperationResult::PackageUpToDate {
                package: held.clone(),
                repository,
            });
        }

        let (source, instance) = best_source(&self.sources, source_indexes, name, &version)
            .ok_or_else(no_source)?;
        tracing::info!(
            package = %instance.full_name(),
            from = source.name(),
            to = %repository,
            "Deploying package"
        );
        let deployed = self.deployer.deploy(&instance, source.as_ref(), publisher.as_mut())?;

        Ok(match held {
            Some(from) => OperationResult::PackageUpdated {
                from,
                to: deployed,
                repository,
            },
            None => OperationResult::PackageAdded {
                package: deployed,
                repository,
            },
        })
    }
}

/// First source repository, in input order, holding `name` at `version`.
fn best_source<'s>(
    sources: &'s [RepositoryRef],
    indexes: &[PackageIndex],
    name: &str,
    version: &crate::version::Version,
) -> Option<(&'s RepositoryRef, PackageInfo)> {
    sources.iter().zip(indexes).find_map(|(source, index)| {
        index.get(name).iter().find(|p| p.version == *version).map(|p| (source, p.clone()))
    })
}

impl Iterator for PublishSession {
    type Item = Result<OperationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, SessionState::Closed) {
            return None;
        }
        let Some(resolved) = self.pending.next() else {
            self.close();
            return None;
        };
        if matches!(self.state, SessionState::NotStarted)
            && let Err(e) = self.open()
        {
            self.close();
            return Some(Err(e));
        }
        let result = self.process(&resolved);
        if result.is_err() || self.pending.len() == 0 {
            self.close();
        }
        Some(result)
    }
}
