use anyhow::Result;
use std::sync::Arc;

use packsync::core::{Capability, PackageError};
use packsync::manager::{AddOptions, CleanOptions};
use packsync::models::{NameFilter, PackageRequest};
use packsync::operation::OperationResult;
use packsync::repository::RepositoryRef;
use packsync::test_utils::MemoryRepository;

use crate::common::{TestEnvironment, kinds};

#[test]
fn test_clean_keeps_resolved_versions() -> Result<()> {
    let env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_dependency("frodo < 2.0")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0")
        .with_project_package("frodo", "1.0.0")
        .with_project_package("frodo", "2.0.0");

    let summary = env
        .manager
        .clean_project_packages(&env.descriptor, &env.project_ref(), &NameFilter::All, CleanOptions::default())?
        .summary()?;

    assert_eq!(summary.cleaned, 2);
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    assert_eq!(env.project.versions("frodo"), vec!["1.0.0"]);
    Ok(())
}

#[test]
fn test_clean_with_nothing_resolved_cannot_do() -> Result<()> {
    let env = TestEnvironment::new()
        .with_dependency("gandalf")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0");

    let results = env.clean(&NameFilter::All)?;

    assert_eq!(results.len(), 1);
    assert!(matches!(&results[0], OperationResult::CleanCannotDo { repository } if repository == "project"));
    assert_eq!(env.project.package_count(), 2);
    Ok(())
}

#[test]
fn test_clean_by_name_never_touches_other_names() -> Result<()> {
    let env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0")
        .with_project_package("frodo", "1.0.0")
        .with_project_package("frodo", "2.0.0")
        .with_project_package("gandalf", "1.0.0");

    let results = env.clean(&NameFilter::Exact("sauron".into()))?;

    assert_eq!(kinds(&results), vec!["cleaned"]);
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    assert_eq!(env.project.versions("frodo"), vec!["1.0.0", "2.0.0"]);
    assert_eq!(env.project.versions("gandalf"), vec!["1.0.0"]);
    Ok(())
}

#[test]
fn test_clean_by_unrelated_name_keeps_everything() -> Result<()> {
    let env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("sauron", "2.0.0");

    let results = env.clean(&NameFilter::Exact("frodo".into()))?;

    assert!(results.is_empty());
    assert_eq!(env.project.package_count(), 2);
    Ok(())
}

#[test]
fn test_clean_moves_anchor_to_resolved_version() -> Result<()> {
    let mut env = TestEnvironment::new().with_dependency("sauron anchored");
    env.project = env
        .project
        .clone()
        .with_anchored_package("sauron", "1.0.0")
        .with_package("sauron", "2.0.0");

    let results = env.clean(&NameFilter::All)?;

    assert_eq!(kinds(&results), vec!["cleaned", "anchored"]);
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    assert!(env.project.is_anchored("sauron", "2.0.0"));
    Ok(())
}

#[test]
fn test_anchored_package_survives_update_then_clean() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");
    env.add(&PackageRequest::any("sauron"), AddOptions::default().anchored(true))?;
    assert!(env.project.is_anchored("sauron", "1.0.0"));

    env.system = env.system.clone().with_package("sauron", "2.0.0");
    let updated = env.update(&NameFilter::All)?;

    // the pin follows the deployed version
    assert_eq!(kinds(&updated), vec!["updated", "anchored"]);
    assert!(env.project.is_anchored("sauron", "2.0.0"));
    assert!(!env.project.is_anchored("sauron", "1.0.0"));

    let cleaned = env.clean(&NameFilter::All)?;

    assert_eq!(kinds(&cleaned), vec!["cleaned"]);
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    Ok(())
}

#[test]
fn test_clean_needs_cleaning_capability() {
    let env = TestEnvironment::new().with_dependency("sauron");
    let project: RepositoryRef = Arc::new(MemoryRepository::new("project").without_cleaning());

    let err = env
        .manager
        .clean_project_packages(&env.descriptor, &project, &NameFilter::All, CleanOptions::default())
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::MissingCapability {
            capability: Capability::Cleaning,
            ..
        })
    ));
}

#[test]
fn test_clean_system_keeps_newest_version() -> Result<()> {
    let env = TestEnvironment::new();
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("sauron", "2.0.0")
        .with_package("sauron", "3.0.0")
        .with_package("frodo", "1.0.0")
        .with_package("frodo", "2.0.0");
    let system: RepositoryRef = Arc::new(machine.clone());

    let summary = env
        .manager
        .clean_system_packages(&system, &NameFilter::All, CleanOptions::default())?
        .summary()?;

    assert_eq!(summary.cleaned, 3);
    assert_eq!(machine.versions("sauron"), vec!["3.0.0"]);
    assert_eq!(machine.versions("frodo"), vec!["2.0.0"]);
    Ok(())
}

#[test]
fn test_clean_system_by_name() -> Result<()> {
    let env = TestEnvironment::new();
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("sauron", "2.0.0")
        .with_package("frodo", "1.0.0")
        .with_package("frodo", "2.0.0");
    let system: RepositoryRef = Arc::new(machine.clone());

    env.manager
        .clean_system_packages(&system, &NameFilter::Exact("Sauron".into()), CleanOptions::default())?
        .collect_all()?;

    assert_eq!(machine.versions("sauron"), vec!["2.0.0"]);
    assert_eq!(machine.versions("frodo"), vec!["1.0.0", "2.0.0"]);
    Ok(())
}
