use anyhow::Result;
use std::sync::Arc;

use packsync::core::{Capability, PackageError};
use packsync::descriptor::DescriptorUpdate;
use packsync::manager::RemoveOptions;
use packsync::models::PackageRequest;
use packsync::operation::OperationResult;
use packsync::repository::RepositoryRef;
use packsync::test_utils::MemoryRepository;
use packsync::version::Version;

use crate::common::{TestEnvironment, kinds};

#[test]
fn test_remove_dependency_from_descriptor() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_dependency("frodo")
        .with_project_package("sauron", "1.0.0");

    let results = env.remove(&PackageRequest::any("SAURON"), RemoveOptions::default())?;

    assert!(matches!(
        &results[..],
        [OperationResult::DescriptorUpdated {
            update: DescriptorUpdate::Removed,
            ..
        }]
    ));
    assert!(!env.descriptor.contains("sauron"));
    assert!(env.descriptor.contains("frodo"));
    // files stay without the clean option
    assert!(env.project.has_package("sauron", "1.0.0"));
    Ok(())
}

#[test]
fn test_remove_absent_dependency_is_not_found() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("frodo")
        .with_project_package("frodo", "1.0.0")
        .with_project_package("sauron", "1.0.0");

    let results = env.remove(&PackageRequest::any("sauron"), RemoveOptions::default().cleaning(true))?;

    assert!(matches!(
        &results[..],
        [OperationResult::DescriptorUpdated {
            update: DescriptorUpdate::NotFound,
            ..
        }]
    ));
    assert!(!results[0].is_success());
    assert_eq!(env.descriptor.len(), 1);
    assert_eq!(env.project.package_count(), 2);
    Ok(())
}

#[test]
fn test_remove_with_clean_deletes_unused_files() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_dependency("frodo")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0")
        .with_project_package("frodo", "1.0.0");

    let results = env.remove(&PackageRequest::any("sauron"), RemoveOptions::default().cleaning(true))?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "cleaned", "cleaned"]);
    assert_eq!(env.project.versions("sauron"), Vec::<String>::new());
    assert!(env.project.has_package("frodo", "1.0.0"));
    Ok(())
}

#[test]
fn test_remove_exact_version_deletes_only_that_file() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0")
        .with_project_package("frodo", "1.0.0");

    let results = env.remove(
        &PackageRequest::exact("sauron", Version::with_build(1, 0, 0)),
        RemoveOptions::default(),
    )?;

    assert_eq!(kinds(&results), vec!["cleaned"]);
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    assert!(env.project.has_package("frodo", "1.0.0"));
    assert!(env.descriptor.contains("sauron"));
    Ok(())
}

#[test]
fn test_remove_last_version() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0");

    let results = env.remove(&PackageRequest::last("sauron"), RemoveOptions::default())?;

    assert_eq!(kinds(&results), vec!["cleaned"]);
    assert_eq!(env.project.versions("sauron"), vec!["1.0.0"]);
    Ok(())
}

#[test]
fn test_remove_last_version_of_absent_package() -> Result<()> {
    let mut env = TestEnvironment::new().with_project_package("frodo", "1.0.0");

    let results = env.remove(&PackageRequest::last("sauron"), RemoveOptions::default())?;

    assert!(results.is_empty());
    assert_eq!(env.project.package_count(), 1);
    Ok(())
}

#[test]
fn test_remove_files_needs_cleaning_capability() {
    let mut env = TestEnvironment::new().with_project_package("sauron", "1.0.0");
    env.project = env.project.clone().without_cleaning();

    let err = env.remove(&PackageRequest::last("sauron"), RemoveOptions::default()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::MissingCapability {
            capability: Capability::Cleaning,
            ..
        })
    ));
    assert!(env.project.has_package("sauron", "1.0.0"));
}

#[test]
fn test_remove_with_clean_checks_capability_before_editing() {
    let mut env = TestEnvironment::new().with_dependency("sauron");
    env.project = env.project.clone().without_cleaning();

    let result = env.remove(&PackageRequest::any("sauron"), RemoveOptions::default().cleaning(true));

    assert!(result.is_err());
    assert!(env.descriptor.contains("sauron"));
}

#[test]
fn test_remove_system_package_versions() -> Result<()> {
    let env = TestEnvironment::new();
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("sauron", "2.0.0")
        .with_package("frodo", "1.0.0");
    let system: RepositoryRef = Arc::new(machine.clone());

    let results = env
        .manager
        .remove_system_package(&PackageRequest::any("sauron"), &system, RemoveOptions::default())?
        .collect_all()?;

    assert_eq!(kinds(&results), vec!["cleaned", "cleaned"]);
    assert!(machine.versions("sauron").is_empty());
    assert!(machine.has_package("frodo", "1.0.0"));
    Ok(())
}

#[test]
fn test_remove_system_exact_version() -> Result<()> {
    let env = TestEnvironment::new();
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("sauron", "2.0.0");
    let system: RepositoryRef = Arc::new(machine.clone());

    env.manager
        .remove_system_package(
            &PackageRequest::exact("sauron", Version::with_build(2, 0, 0)),
            &system,
            RemoveOptions::default(),
        )?
        .collect_all()?;

    assert_eq!(machine.versions("sauron"), vec!["1.0.0"]);
    Ok(())
}
