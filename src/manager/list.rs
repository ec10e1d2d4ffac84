//! Listing packages across repositories.

use anyhow::Result;
use std::collections::BTreeMap;

use super::{ListOptions, PackageManager};
use crate::models::{PackageInfo, name_key};
use crate::operation::{OperationResult, OperationStream};
use crate::pattern::WildcardPattern;
use crate::repository::RepositoryRef;

impl PackageManager {
    /// Reports every package instance held by `repositories` whose name
    /// matches `query`, grouped by name.
    ///
    /// Within a name, instances appear in repository order, then ascending
    /// version. Nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidPattern`](crate::core::PackageError::InvalidPattern)
    /// if `query` is not a valid wildcard pattern.
    pub fn list_packages(
        &self,
        repositories: &[RepositoryRef],
        query: Option<&str>,
        options: ListOptions,
    ) -> Result<OperationStream<'static>> {
        let pattern = query.map(WildcardPattern::new).transpose()?;
        let repositories = repositories.to_vec();
        Ok(OperationStream::deferred(move || {
            let mut found: BTreeMap<String, Vec<PackageInfo>> = BTreeMap::new();
            for repository in &repositories {
                let index = repository.packages_by_name();
                let packages: Box<dyn Iterator<Item = &PackageInfo> + '_> = if options.latest_only {
                    Box::new(index.latest_packages())
                } else {
                    Box::new(index.packages())
                };
                for package in packages {
                    if pattern.as_ref().is_none_or(|p| p.matches(&package.name)) {
                        found.entry(name_key(&package.name)).or_default().push(package.clone());
                    }
                }
            }
            tracing::debug!(
                query = pattern.as_ref().map_or("*", WildcardPattern::as_str),
                names = found.len(),
                "Listed packages"
            );
            let results = found.into_values().flatten().map(|p| Ok(OperationResult::PackageFound(p)));
            Ok(OperationStream::new(results))
        }))
    }
}
