//! Version constraints ("vertices") attached to a dependency.
//!
//! A [`VersionVertex`] is a predicate over a candidate [`Version`]. A dependency
//! carries a [`ConstraintSet`]; a candidate satisfies the dependency only when
//! every vertex in the set accepts it.
//!
//! | Vertex | Text form | Accepts |
//! |--------|-----------|---------|
//! | `Any` | `*` | every version |
//! | `Equal(v)` | `= v` | exactly `v` |
//! | `GreaterOrEqual(v)` | `>= v` | `v` and newer |
//! | `LessThan(v)` | `< v` | strictly older than `v` |
//! | `UpdateFrom(v)` | `~> v` | any upgrade of `v` (see below) |
//!
//! # Update semantics
//!
//! `UpdateFrom(existing)` accepts a candidate that is newer than `existing` at
//! the deepest component where they differ, checked from the revision level
//! outwards:
//!
//! 1. same `major.minor.build`, greater `revision`
//! 2. same `major.minor`, greater `build`
//! 3. same `major`, greater `minor`
//! 4. greater `major`
//!
//! ```rust,no_run
//! use packsync::version::{Version, VersionVertex};
//!
//! let update = VersionVertex::UpdateFrom(Version::parse("1.0.0.1")?);
//! assert!(update.is_compatible_with(&Version::parse("1.0.0.2")?));
//! assert!(update.is_compatible_with(&Version::parse("2.0")?));
//! assert!(!update.is_compatible_with(&Version::parse("1.0.0.1")?));
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

use super::Version;
use crate::core::PackageError;

pub mod constraint_set;

pub use constraint_set::ConstraintSet;

/// A single predicate over a candidate version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionVertex {
    /// Satisfied by every version.
    Any,
    /// Satisfied only by this exact version.
    Equal(Version),
    /// Satisfied by this version and anything newer.
    GreaterOrEqual(Version),
    /// Satisfied by anything strictly older than this version.
    LessThan(Version),
    /// Satisfied by any strictly newer version, compared from the revision level outwards.
    UpdateFrom(Version),
}

impl VersionVertex {
    /// Checks whether `candidate` satisfies this vertex.
    #[must_use]
    pub fn is_compatible_with(&self, candidate: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Equal(v) => candidate == v,
            Self::GreaterOrEqual(v) => candidate >= v,
            Self::LessThan(v) => candidate < v,
            Self::UpdateFrom(existing) => is_update_of(existing, candidate),
        }
    }

    /// The version the vertex is anchored on, `None` for [`VersionVertex::Any`].
    #[must_use]
    pub const fn version(&self) -> Option<&Version> {
        match self {
            Self::Any => None,
            Self::Equal(v) | Self::GreaterOrEqual(v) | Self::LessThan(v) | Self::UpdateFrom(v) => {
                Some(v)
            }
        }
    }

    /// Parses the text form `*`, `= v`, `>= v`, `< v` or `~> v`.
    ///
    /// A bare version is read as `= v`.
    ///
    /// # Errors
    ///
    /// Returns an error when the version part does not parse.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed == "*" {
            return Ok(Self::Any);
        }
        let (make, rest): (fn(Version) -> Self, &str) =
            if let Some(rest) = trimmed.strip_prefix(">=") {
                (Self::GreaterOrEqual, rest)
            } else if let Some(rest) = trimmed.strip_prefix("~>") {
                (Self::UpdateFrom, rest)
            } else if let Some(rest) = trimmed.strip_prefix('<') {
                (Self::LessThan, rest)
            } else if let Some(rest) = trimmed.strip_prefix('=') {
                (Self::Equal, rest)
            } else {
                (Self::Equal, trimmed)
            };
        let version = Version::parse(rest).map_err(|e| PackageError::InvalidDependencySpec {
            spec: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(make(version))
    }
}

fn is_update_of(existing: &Version, candidate: &Version) -> bool {
    let same_major = existing.major() == candidate.major();
    let same_minor = same_major && existing.minor() == candidate.minor();
    let same_build = same_minor && existing.build() == candidate.build();

    (same_build && existing.revision() < candidate.revision())
        || (same_minor && existing.build() < candidate.build())
        || (same_major && existing.minor() < candidate.minor())
        || existing.major() < candidate.major()
}

impl fmt::Display for VersionVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Equal(v) => write!(f, "= {v}"),
            Self::GreaterOrEqual(v) => write!(f, ">= {v}"),
            Self::LessThan(v) => write!(f, "< {v}"),
            Self::UpdateFrom(v) => write!(f, "~> {v}"),
        }
    }
}

impl FromStr for VersionVertex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
