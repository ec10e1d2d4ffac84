use anyhow::Result;
use std::sync::Arc;

use packsync::core::PackageError;
use packsync::descriptor::DescriptorUpdate;
use packsync::manager::AddOptions;
use packsync::models::PackageRequest;
use packsync::operation::OperationResult;
use packsync::repository::RepositoryRef;
use packsync::test_utils::MemoryRepository;
use packsync::version::Version;

use crate::common::{TestEnvironment, kinds};

#[test]
fn test_add_updates_package_already_present() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("sauron >= 2.0")
        .with_project_package("sauron", "1.0.0")
        .with_system_package("sauron", "2.0.0");

    let results = env.add(&PackageRequest::any("sauron"), AddOptions::default())?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "updated"]);
    match &results[1] {
        OperationResult::PackageUpdated { from, to, .. } => {
            assert_eq!(from.version, Version::with_build(1, 0, 0));
            assert_eq!(to.version, Version::with_build(2, 0, 0));
        }
        other => panic!("unexpected result {other}"),
    }
    assert!(env.project.has_package("sauron", "2.0.0"));

    // the project now resolves to 2.0.0, so cleaning drops 1.0.0
    env.clean(&packsync::models::NameFilter::All)?;
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    Ok(())
}

#[test]
fn test_add_with_min_and_max_version() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_system_package("sauron", "1.0.0")
        .with_system_package("sauron", "2.0.0")
        .with_system_package("sauron", "3.0.0");

    let request = PackageRequest::between("sauron", Version::with_build(1, 0, 0), Version::with_build(3, 0, 0));
    let results = env.add(&request, AddOptions::default())?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "added"]);
    assert_eq!(env.project.versions("sauron"), vec!["2.0.0"]);
    assert_eq!(
        env.descriptor.get("sauron").map(ToString::to_string).as_deref(),
        Some("sauron >= 1.0.0 and < 3.0.0")
    );
    Ok(())
}

#[test]
fn test_adding_twice_is_up_to_date() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");

    let first = env.add(&PackageRequest::any("sauron"), AddOptions::default())?;
    assert_eq!(kinds(&first), vec!["descriptor-updated", "added"]);

    let second = env.add(&PackageRequest::any("sauron"), AddOptions::default())?;
    assert_eq!(kinds(&second), vec!["descriptor-updated", "up-to-date"]);
    assert_eq!(env.project.published_files().len(), 1);
    Ok(())
}

#[test]
fn test_adding_existing_dependency_replaces_it() -> Result<()> {
    let mut env = TestEnvironment::new()
        .with_dependency("Sauron >= 1.0")
        .with_dependency("frodo")
        .with_system_package("sauron", "1.0.0");

    let results = env.add(
        &PackageRequest::exact("sauron", Version::with_build(1, 0, 0)),
        AddOptions::default(),
    )?;

    let updates: Vec<&DescriptorUpdate> = results
        .iter()
        .filter_map(|r| match r {
            OperationResult::DescriptorUpdated { update, .. } => Some(update),
            _ => None,
        })
        .collect();
    assert_eq!(updates, vec![&DescriptorUpdate::Updated]);
    assert_eq!(env.descriptor.len(), 2);
    assert_eq!(env.descriptor.dependencies().iter().filter(|d| d.has_name("SAURON")).count(), 1);
    // frodo is in no repository, but only the added name is copied
    assert!(results.iter().all(OperationResult::is_success));
    Ok(())
}

#[test]
fn test_descriptor_untouched_without_update_descriptor() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");

    let results = env.add(
        &PackageRequest::any("sauron"),
        AddOptions::default().updating_descriptor(false),
    )?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "added"]);
    assert!(env.descriptor.is_empty());
    assert!(env.project.has_package("sauron", "1.0.0"));
    Ok(())
}

#[test]
fn test_nothing_happens_until_iterated() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");
    let sources = env.sources();
    let project = env.project_ref();

    let stream = env.manager.add_project_package(
        &PackageRequest::any("sauron"),
        &sources,
        &mut env.descriptor,
        &project,
        AddOptions::default(),
    )?;
    drop(stream);

    assert!(env.descriptor.is_empty());
    assert_eq!(env.project.package_count(), 0);
    Ok(())
}

#[test]
fn test_partial_iteration_commits_only_the_prefix() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");
    let sources = env.sources();
    let project = env.project_ref();

    let mut stream = env.manager.add_project_package(
        &PackageRequest::any("sauron"),
        &sources,
        &mut env.descriptor,
        &project,
        AddOptions::default(),
    )?;
    let first = stream.next().expect("descriptor result")?;
    drop(stream);

    assert!(matches!(
        first,
        OperationResult::DescriptorUpdated {
            update: DescriptorUpdate::Added,
            ..
        }
    ));
    assert!(env.descriptor.contains("sauron"));
    assert_eq!(env.project.package_count(), 0);
    Ok(())
}

#[test]
fn test_missing_package_stops_before_copy() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");

    let results = env.add(&PackageRequest::any("gandalf"), AddOptions::default())?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "missing"]);
    assert_eq!(env.project.sessions_opened(), 0);
    assert_eq!(env.project.package_count(), 0);
    Ok(())
}

#[test]
fn test_anchored_add_pins_version() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");

    let results = env.add(&PackageRequest::any("sauron"), AddOptions::default().anchored(true))?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "added", "anchored"]);
    assert!(env.project.is_anchored("sauron", "1.0.0"));
    assert!(env.descriptor.get("sauron").is_some_and(|d| d.is_anchored()));
    Ok(())
}

#[test]
fn test_deployment_failure_propagates() {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");
    env.system = env.system.clone().failing_reads();

    let err = env.add(&PackageRequest::any("sauron"), AddOptions::default()).unwrap_err();

    assert!(matches!(err.downcast_ref::<PackageError>(), Some(PackageError::DeploymentFailed { .. })));
    assert_eq!(env.project.sessions_opened(), 1);
    assert_eq!(env.project.sessions_closed(), 1);
    // the descriptor edit came first and stays committed
    assert!(env.descriptor.contains("sauron"));
}

#[test]
fn test_invalid_request_fails_at_call() {
    let mut env = TestEnvironment::new();
    let request = PackageRequest::between("sauron", Version::new(3, 0), Version::new(1, 0));

    let err = env.add(&request, AddOptions::default()).unwrap_err();

    assert!(matches!(err.downcast_ref::<PackageError>(), Some(PackageError::InvalidRequest { .. })));
    assert!(env.descriptor.is_empty());
}

#[test]
fn test_add_system_package() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "1.0.0")
        .with_system_package("sauron", "2.0.0");
    let machine = MemoryRepository::new("machine");
    let destination: RepositoryRef = Arc::new(machine.clone());

    let results = env
        .manager
        .add_system_package(&PackageRequest::any("sauron"), &env.sources(), &destination, AddOptions::default())?
        .collect_all()?;

    assert_eq!(kinds(&results), vec!["added"]);
    assert_eq!(machine.versions("sauron"), vec!["2.0.0"]);
    assert_eq!(machine.published_files(), vec!["sauron-2.0.0.wrap"]);
    Ok(())
}

#[test]
fn test_first_source_wins() -> Result<()> {
    let mut env = TestEnvironment::new().with_system_package("sauron", "1.0.0");
    let mirror = MemoryRepository::new("mirror").with_package("sauron", "1.0.0").failing_reads();
    let sources: Vec<RepositoryRef> = vec![env.system_ref(), Arc::new(mirror)];
    let project = env.project_ref();

    let results = env
        .manager
        .add_project_package(
            &PackageRequest::any("sauron"),
            &sources,
            &mut env.descriptor,
            &project,
            AddOptions::default(),
        )?
        .collect_all()?;

    assert_eq!(kinds(&results), vec!["descriptor-updated", "added"]);
    Ok(())
}
