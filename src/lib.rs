//! packsync - package resolution and repository synchronization
//!
//! A library for managing versioned packages held in repositories. A project
//! declares what it needs in a descriptor; packsync resolves those
//! declarations against source repositories, copies the selection into the
//! project (or system) repository, anchors pinned versions, cleans out
//! versions nothing uses any more and fires lifecycle hooks when the package
//! set changes.
//!
//! # Architecture Overview
//!
//! - **Descriptors** list dependencies with version constraints
//!   (`sauron >= 2.0 and < 3.0 anchored`)
//! - **Repositories** hold package instances and optionally support cleaning,
//!   publishing and anchoring
//! - The **resolver** picks one version per package name
//! - The **sync engine** copies a resolution into destination repositories
//! - The **package manager** composes all of the above into add, update,
//!   remove, clean and list operations for the project and system scopes
//!
//! ## Lazy operations
//!
//! Every operation returns an [`OperationStream`](operation::OperationStream).
//! Nothing happens until it is advanced, and each advanced result performs
//! exactly the work it reports. Dropping a stream part-way leaves the work
//! done so far in place; callers that need all-or-nothing semantics drain the
//! stream with [`collect_all`](operation::OperationStream::collect_all) or
//! [`summary`](operation::OperationStream::summary) before acting on it.
//!
//! Recoverable outcomes (conflicts, missing packages, up-to-date packages) are
//! reported as [`OperationResult`](operation::OperationResult) values. Only
//! broken preconditions and collaborator failures are errors.
//!
//! # Core Modules
//!
//! ## Model
//! - [`version`] - Four-part versions and version constraints
//! - [`models`] - Package requests, identifiers and instances
//! - [`descriptor`] - Dependency lists, their text form and TOML files
//!
//! ## Collaborators
//! - [`repository`] - Repository trait, capabilities and package index
//! - [`resolver`] - Dependency resolution and shared-resource detection
//! - [`deploy`] - Copying package content between repositories
//!
//! ## Operations
//! - [`operation`] - Operation results and lazy result streams
//! - [`sync`] - The resolve-and-copy pipeline
//! - [`hooks`] - Lifecycle hooks fired on package set changes
//! - [`manager`] - The package manager façade
//!
//! ## Supporting modules
//! - [`config`] - User configuration (`~/.packsync/config.toml`)
//! - [`core`] - Error types
//! - [`constants`] - Shared constants
//! - [`pattern`] - Wildcard matching for list queries
//!
//! # Example
//!
//! ```rust,no_run
//! use packsync::descriptor::PackageDescriptor;
//! use packsync::manager::PackageManager;
//! use packsync::models::{NameFilter, PackageRequest};
//! # use packsync::repository::RepositoryRef;
//! # fn example(sources: Vec<RepositoryRef>, project: RepositoryRef) -> anyhow::Result<()> {
//! let manager = PackageManager::new();
//! let mut descriptor = PackageDescriptor::load(std::path::Path::new("project.wrapdesc"))?;
//!
//! for result in manager.add_project_package(
//!     &PackageRequest::any("sauron"),
//!     &sources,
//!     &mut descriptor,
//!     &project,
//!     manager.add_options(),
//! )? {
//!     println!("{}", result?);
//! }
//!
//! let summary = manager
//!     .clean_project_packages(&descriptor, &project, &NameFilter::All, manager.clean_options())?
//!     .summary()?;
//! println!("{} versions cleaned", summary.cleaned);
//! # Ok(())
//! # }
//! ```

// Model
pub mod descriptor;
pub mod models;
pub mod version;

// Collaborators
pub mod deploy;
pub mod repository;
pub mod resolver;

// Operations
pub mod hooks;
pub mod manager;
pub mod operation;
pub mod sync;

// Supporting modules
pub mod config;
pub mod constants;
pub mod core;
pub mod pattern;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
