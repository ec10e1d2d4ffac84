use anyhow::Result;
use std::sync::Arc;

use packsync::manager::UpdateOptions;
use packsync::models::{NameFilter, PackageInfo};
use packsync::operation::OperationResult;
use packsync::repository::RepositoryRef;
use packsync::test_utils::MemoryRepository;
use packsync::version::Version;

use crate::common::{TestEnvironment, kinds};

#[test]
fn test_update_project_to_newest_satisfying_version() -> Result<()> {
    let env = TestEnvironment::new()
        .with_dependency("sauron < 3.0")
        .with_project_package("sauron", "1.0.0")
        .with_system_package("sauron", "2.0.0")
        .with_system_package("sauron", "3.0.0");

    let results = env.update(&NameFilter::All)?;

    assert_eq!(kinds(&results), vec!["updated"]);
    assert!(env.project.has_package("sauron", "2.0.0"));
    assert!(!env.project.has_package("sauron", "3.0.0"));
    Ok(())
}

#[test]
fn test_update_by_name_leaves_other_dependencies() -> Result<()> {
    let env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_dependency("frodo")
        .with_project_package("sauron", "1.0.0")
        .with_project_package("frodo", "1.0.0")
        .with_system_package("sauron", "2.0.0")
        .with_system_package("frodo", "2.0.0");

    let results = env.update(&NameFilter::Exact("FRODO".into()))?;

    assert_eq!(kinds(&results), vec!["updated"]);
    assert_eq!(env.project.versions("frodo"), vec!["1.0.0", "2.0.0"]);
    assert_eq!(env.project.versions("sauron"), vec!["1.0.0"]);
    Ok(())
}

#[test]
fn test_update_brings_in_new_transitive_dependencies() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("sauron")
        .with_project_package("sauron", "1.0.0")
        .with_system_package("ring", "1.0.0");
    env.system = env.system.clone().with_info(
        PackageInfo::new("sauron", Version::with_build(2, 0, 0), "").with_dependency("ring >= 1.0".parse()?),
    );

    let results = env.update(&NameFilter::All)?;

    // dependencies are copied before their dependents
    assert_eq!(kinds(&results), vec!["added", "updated"]);
    assert!(env.project.has_package("ring", "1.0.0"));
    assert!(env.project.has_package("sauron", "2.0.0"));
    Ok(())
}

#[test]
fn test_conflicting_requirements_abort_the_copy() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("ring < 2.0")
        .with_dependency("sauron")
        .with_system_package("ring", "1.0.0")
        .with_system_package("ring", "2.0.0");
    env.system = env.system.clone().with_info(
        PackageInfo::new("sauron", Version::with_build(1, 0, 0), "").with_dependency("ring >= 2.0".parse()?),
    );

    let results = env.update(&NameFilter::All)?;

    assert_eq!(kinds(&results), vec!["conflict"]);
    assert!(matches!(&results[0], OperationResult::PackageConflict(r) if r.name() == "ring"));
    assert_eq!(env.project.package_count(), 0);
    assert_eq!(env.project.sessions_opened(), 0);
    Ok(())
}

#[test]
fn test_update_system_packages_to_newest_version() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "1.0.1")
        .with_system_package("sauron", "2.0.0")
        .with_system_package("frodo", "1.0.0");
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("frodo", "1.0.0");
    let destination: RepositoryRef = Arc::new(machine.clone());

    let results = env
        .manager
        .update_system_packages(&env.sources(), &destination, &NameFilter::All, UpdateOptions::default())?
        .collect_all()?;

    // names are visited in order: frodo has nothing newer, sauron moves up
    assert_eq!(kinds(&results), vec!["up-to-date", "updated"]);
    assert!(results.iter().all(OperationResult::is_success));
    assert_eq!(machine.versions("sauron"), vec!["1.0.0", "2.0.0"]);
    Ok(())
}

#[test]
fn test_update_system_package_by_name() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "2.0.0")
        .with_system_package("frodo", "2.0.0");
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("frodo", "1.0.0");
    let destination: RepositoryRef = Arc::new(machine.clone());

    let results = env
        .manager
        .update_system_packages(
            &env.sources(),
            &destination,
            &NameFilter::Exact("sauron".into()),
            UpdateOptions::default(),
        )?
        .collect_all()?;

    assert_eq!(kinds(&results), vec!["updated"]);
    assert_eq!(machine.versions("frodo"), vec!["1.0.0"]);
    Ok(())
}

#[test]
fn test_update_system_reads_held_packages_lazily() -> Result<()> {
    let env = TestEnvironment::new().with_system_package("sauron", "2.0.0");
    let machine = MemoryRepository::new("machine");
    let destination: RepositoryRef = Arc::new(machine.clone());

    let stream = env.manager.update_system_packages(
        &env.sources(),
        &destination,
        &NameFilter::All,
        UpdateOptions::default(),
    )?;
    // installed after the operation was created, before it ran
    let machine = machine.with_package("sauron", "1.0.0");

    assert_eq!(kinds(&stream.collect_all()?), vec!["updated"]);
    assert!(machine.has_package("sauron", "2.0.0"));
    Ok(())
}

#[test]
fn test_update_system_package_no_source_hosts_is_missing() -> Result<()> {
    let env = TestEnvironment::new().with_system_package("sauron", "1.0.0");
    let machine = MemoryRepository::new("machine")
        .with_package("sauron", "1.0.0")
        .with_package("frodo", "1.0.0");
    let destination: RepositoryRef = Arc::new(machine.clone());

    let results = env
        .manager
        .update_system_packages(&env.sources(), &destination, &NameFilter::All, UpdateOptions::default())?
        .collect_all()?;

    // frodo is hosted nowhere, sauron is hosted at the held version
    assert_eq!(kinds(&results), vec!["missing", "up-to-date"]);
    assert!(matches!(&results[0], OperationResult::PackageMissing(r) if r.name() == "frodo"));
    assert!(!results[0].is_success());
    assert_eq!(machine.package_count(), 2);
    Ok(())
}
