//! Copying package content between repositories.

use anyhow::Result;

use crate::constants::PACKAGE_FILE_EXTENSION;
use crate::core::PackageError;
use crate::models::PackageInfo;
use crate::repository::{PackagePublisher, PackageRepository};

/// Copies one package from a source repository into a publishing session.
pub trait PackageDeployer: Send + Sync {
    /// Deploys `package`, hosted by `source`, through `publisher`.
    ///
    /// Failures are hard errors; this layer does not retry.
    fn deploy(
        &self,
        package: &PackageInfo,
        source: &dyn PackageRepository,
        publisher: &mut dyn PackagePublisher,
    ) -> Result<PackageInfo>;
}

/// Deployer that republishes the raw package content as `<name>-<version>.wrap`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishingDeployer;

impl PublishingDeployer {
    /// File name a package is published under.
    #[must_use]
    pub fn file_name(package: &PackageInfo) -> String {
        format!("{}.{PACKAGE_FILE_EXTENSION}", package.full_name())
    }
}

impl PackageDeployer for PublishingDeployer {
    fn deploy(
        &self,
        package: &PackageInfo,
        source: &dyn PackageRepository,
        publisher: &mut dyn PackagePublisher,
    ) -> Result<PackageInfo> {
        let failed = |reason: String| PackageError::DeploymentFailed {
            name: package.name.clone(),
            version: package.version.to_string(),
            repository: source.name().to_string(),
            reason,
        };

        let content = source.open_package(package).map_err(|e| failed(format!("{e:#}")))?;
        let file_name = Self::file_name(package);
        tracing::trace!(file = %file_name, bytes = content.len(), "Publishing package content");
        let published = publisher.publish(&file_name, &content).map_err(|e| failed(format!("{e:#}")))?;
        Ok(published)
    }
}
