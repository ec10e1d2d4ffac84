//! Core types shared by every packsync module.
//!
//! - [`PackageError`] - enumerated failures for exceptional conditions
//! - [`Capability`] - optional repository capabilities checked at call entry
//! - [`Result`] - the crate-wide `anyhow` result alias

pub mod error;

pub use error::{Capability, PackageError};

/// Crate-wide result alias.
pub type Result<T> = anyhow::Result<T>;
