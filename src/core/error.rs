//! Error handling for packsync
//!
//! Exceptional conditions raised by the engine are modelled by [`PackageError`].
//! Everything that is an expected outcome of an operation (a dependency that
//! cannot be found, two requirements that contradict each other, a package
//! that is already up to date) is *not* an error: it is reported as an
//! [`OperationResult`](crate::operation::OperationResult) in the operation's
//! result stream.
//!
//! # Error Categories
//!
//! - **Preconditions**: [`PackageError::MissingCapability`],
//!   [`PackageError::InvalidPackageName`], [`PackageError::InvalidRequest`].
//!   These are raised when an operation is constructed, before any side effect.
//! - **Parsing**: [`PackageError::InvalidVersion`],
//!   [`PackageError::InvalidDependencySpec`], [`PackageError::InvalidPattern`],
//!   [`PackageError::DescriptorParseError`], [`PackageError::ConfigError`].
//! - **Collaborator failures**: [`PackageError::NoSourceForPackage`],
//!   [`PackageError::PackageContentNotFound`], [`PackageError::DeploymentFailed`],
//!   [`PackageError::HookFailed`]. These interrupt a result stream mid-flight;
//!   results emitted before the failure stay committed.
//!
//! Fallible functions in this crate return [`anyhow::Result`]. Callers that need
//! to branch on the failure kind downcast:
//!
//! ```rust,no_run
//! use packsync::core::{Capability, PackageError};
//!
//! fn is_capability_error(err: &anyhow::Error) -> bool {
//!     matches!(
//!         err.downcast_ref::<PackageError>(),
//!         Some(PackageError::MissingCapability { capability: Capability::Cleaning, .. })
//!     )
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Optional repository capabilities checked at operation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The repository can delete package instances outside a keep-set.
    Cleaning,
    /// The repository can accept new packages through a publishing session.
    Publishing,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cleaning => "cleaning",
            Self::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// The main error type for packsync operations.
#[derive(Error, Debug)]
pub enum PackageError {
    /// A repository handed to an operation lacks a capability the operation needs.
    ///
    /// Raised when the operation is constructed, never after a side effect.
    #[error("Repository '{repository}' does not support {capability}")]
    MissingCapability {
        /// Name of the offending repository
        repository: String,
        /// The capability that was required
        capability: Capability,
    },

    /// Package name is empty or contains characters outside `[A-Za-z0-9._-]`
    #[error("Invalid package name '{name}'")]
    InvalidPackageName {
        /// The rejected name
        name: String,
    },

    /// A package request combines version fields that cannot be used together
    #[error("Invalid request for package '{name}': {reason}")]
    InvalidRequest {
        /// Requested package name
        name: String,
        /// Why the request was rejected
        reason: String,
    },

    /// Version string could not be parsed
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// The rejected version string
        version: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Dependency line could not be parsed
    #[error("Invalid dependency '{spec}': {reason}")]
    InvalidDependencySpec {
        /// The rejected dependency line
        spec: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Wildcard query could not be compiled
    #[error("Invalid package query '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected query
        pattern: String,
        /// Compiler diagnostic
        reason: String,
    },

    /// A resolved package has no instance in any of the source repositories
    #[error("No source repository hosts {name} {version}")]
    NoSourceForPackage {
        /// Package name
        name: String,
        /// Resolved version
        version: String,
    },

    /// A repository listed a package but could not produce its content
    #[error("Content for {name} {version} not found in repository '{repository}'")]
    PackageContentNotFound {
        /// Package name
        name: String,
        /// Package version
        version: String,
        /// Repository that was asked for the content
        repository: String,
    },

    /// Copying a package into a destination repository failed
    #[error("Failed to deploy {name} {version} to '{repository}': {reason}")]
    DeploymentFailed {
        /// Package name
        name: String,
        /// Package version
        version: String,
        /// Destination repository
        repository: String,
        /// Underlying failure
        reason: String,
    },

    /// A registered lifecycle hook returned an error
    #[error("{scope} hook for '{name}' failed: {reason}")]
    HookFailed {
        /// Scope label the hook was registered for
        scope: String,
        /// Package the hook was invoked for
        name: String,
        /// Underlying failure
        reason: String,
    },

    /// Descriptor file could not be parsed
    #[error("Invalid descriptor file {file}: {reason}")]
    DescriptorParseError {
        /// Path of the descriptor file
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

impl PackageError {
    /// Shorthand for [`PackageError::MissingCapability`].
    pub fn missing_capability(repository: impl Into<String>, capability: Capability) -> Self {
        Self::MissingCapability {
            repository: repository.into(),
            capability,
        }
    }

    /// Returns `true` for errors that are raised before an operation does any work.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingCapability { .. }
                | Self::InvalidPackageName { .. }
                | Self::InvalidRequest { .. }
                | Self::InvalidPattern { .. }
        )
    }
}
