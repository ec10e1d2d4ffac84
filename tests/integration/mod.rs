//! Integration test suite for packsync
//!
//! These tests drive `PackageManager` end to end against in-memory
//! repositories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! Tests are organized by operation:
//! - **add**: Adding project and system packages
//! - **update**: Updating project and system packages
//! - **remove**: Removing dependencies and package files
//! - **clean**: Cleaning unused versions
//! - **list**: Listing and querying packages
//! - **hooks**: Lifecycle hooks
//! - **config**: Option defaults from the configuration file

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod add;
mod clean;
mod list;
mod remove;
mod update;
