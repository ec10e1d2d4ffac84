use anyhow::Result;
use std::sync::Arc;

use packsync::core::PackageError;
use packsync::manager::ListOptions;
use packsync::operation::OperationResult;
use packsync::repository::RepositoryRef;
use packsync::test_utils::MemoryRepository;

use crate::common::TestEnvironment;

fn found(results: &[OperationResult]) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| match r {
            OperationResult::PackageFound(p) => Some(format!("{}-{}", p.name, p.version)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_list_matches_wildcard_ignoring_case() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "1.0.0")
        .with_system_package("Saruman", "1.0.0")
        .with_system_package("frodo", "1.0.0");

    let results = env
        .manager
        .list_packages(&env.sources(), Some("SA*"), ListOptions::default())?
        .collect_all()?;

    assert_eq!(found(&results), vec!["Saruman-1.0.0", "sauron-1.0.0"]);
    Ok(())
}

#[test]
fn test_list_without_query_returns_everything() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "1.0.0")
        .with_system_package("sauron", "2.0.0")
        .with_system_package("frodo", "1.0.0");

    let results = env
        .manager
        .list_packages(&env.sources(), None, ListOptions::default())?
        .collect_all()?;

    assert_eq!(found(&results), vec!["frodo-1.0.0", "sauron-1.0.0", "sauron-2.0.0"]);
    Ok(())
}

#[test]
fn test_list_groups_names_across_repositories() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "2.0.0")
        .with_system_package("frodo", "1.0.0")
        .with_project_package("sauron", "1.0.0");
    let repositories: Vec<RepositoryRef> = vec![env.system_ref(), env.project_ref()];

    let results = env
        .manager
        .list_packages(&repositories, Some("sauron"), ListOptions::default())?
        .collect_all()?;

    // repository order within a name
    let sources: Vec<&str> = results
        .iter()
        .filter_map(|r| match r {
            OperationResult::PackageFound(p) => Some(p.source.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(found(&results), vec!["sauron-2.0.0", "sauron-1.0.0"]);
    assert_eq!(sources, vec!["system", "project"]);
    Ok(())
}

#[test]
fn test_list_latest_only() -> Result<()> {
    let env = TestEnvironment::new()
        .with_system_package("sauron", "1.0.0")
        .with_system_package("sauron", "2.0.0")
        .with_system_package("frodo", "1.0.0");

    let results = env
        .manager
        .list_packages(&env.sources(), None, ListOptions { latest_only: true })?
        .collect_all()?;

    assert_eq!(found(&results), vec!["frodo-1.0.0", "sauron-2.0.0"]);
    Ok(())
}

#[test]
fn test_list_no_match_is_empty() -> Result<()> {
    let env = TestEnvironment::new().with_system_package("sauron", "1.0.0");

    let results = env
        .manager
        .list_packages(&env.sources(), Some("gandalf?"), ListOptions::default())?
        .collect_all()?;

    assert!(results.is_empty());
    Ok(())
}

#[test]
fn test_list_invalid_pattern_fails_at_call() {
    let env = TestEnvironment::new();

    let err = env
        .manager
        .list_packages(&env.sources(), Some("sau[ron"), ListOptions::default())
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::InvalidPattern { pattern, .. }) if pattern == "sau[ron"
    ));
}

#[test]
fn test_list_reads_repositories_lazily() -> Result<()> {
    let env = TestEnvironment::new();
    let machine = MemoryRepository::new("machine");
    let repositories: Vec<RepositoryRef> = vec![Arc::new(machine.clone())];

    let stream = env.manager.list_packages(&repositories, None, ListOptions::default())?;
    let _machine = machine.with_package("sauron", "1.0.0");

    assert_eq!(found(&stream.collect_all()?), vec!["sauron-1.0.0"]);
    Ok(())
}
