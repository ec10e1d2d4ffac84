//! Test utilities for packsync
//!
//! This module provides an in-memory repository and logging setup for unit and
//! integration tests. It is compiled for the crate's own tests and, through the
//! `test-utils` feature, for the integration test target.
//!
//! # Example
//!
//! ```rust,no_run
//! use packsync::test_utils::{MemoryRepository, init_test_logging};
//!
//! init_test_logging(None);
//! let system = MemoryRepository::new("system")
//!     .with_package("sauron", "1.0.0")
//!     .with_package("sauron", "2.0.0");
//! assert!(system.has_package("sauron", "2.0.0"));
//! ```

mod memory_repository;

pub use memory_repository::MemoryRepository;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a `tracing` subscriber once, regardless of how many times it is
/// called. An explicit `level` wins; otherwise `RUST_LOG` is honoured, and with
/// neither nothing is installed.
///
/// ```bash
/// RUST_LOG=packsync=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
