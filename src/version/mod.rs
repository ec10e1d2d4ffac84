//! Package versions and version constraints.
//!
//! Packages are versioned with up to four numeric components,
//! `major.minor.build.revision`. Only `major` is mandatory when parsing; a
//! missing `minor` is read as `0` while missing `build` and `revision` stay
//! *undefined*. Undefined components sort before every defined value, so
//! `2.0 < 2.0.0 < 2.0.0.0 < 2.0.0.1`.
//!
//! ```rust,no_run
//! use packsync::version::Version;
//!
//! let v = Version::parse("v1.2.3")?;
//! assert_eq!(v.major(), 1);
//! assert_eq!(v.build(), Some(3));
//! assert_eq!(v.revision(), None);
//! assert!(Version::parse("1.2")? < v);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Semantic versions interoperate through [`From<&semver::Version>`]: `patch`
//! becomes `build`, pre-release and build metadata are dropped.

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::PackageError;

pub mod constraints;

pub use constraints::{ConstraintSet, VersionVertex};

/// A four-part package version.
///
/// Field order drives the derived ordering: `major`, then `minor`, then
/// `build`, then `revision`, with `None` ordering before `Some(_)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
    build: Option<u32>,
    revision: Option<u32>,
}

impl Version {
    /// Creates a `major.minor` version.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    /// Creates a `major.minor.build` version.
    #[must_use]
    pub const fn with_build(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            build: Some(build),
            revision: None,
        }
    }

    /// Creates a fully specified `major.minor.build.revision` version.
    #[must_use]
    pub const fn with_revision(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build: Some(build),
            revision: Some(revision),
        }
    }

    /// Parses a version string.
    ///
    /// Accepts one to four dot-separated non-negative integers, optionally
    /// prefixed with `v` or `V`. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidVersion`] for empty input, more than four
    /// components, or non-numeric components.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
        let invalid = |reason: &str| PackageError::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        if body.is_empty() {
            return Err(invalid("version is empty").into());
        }

        let mut components = Vec::with_capacity(4);
        for part in body.split('.') {
            let value = part
                .parse::<u32>()
                .map_err(|e| invalid(&format!("component '{part}' is not a number ({e})")))?;
            components.push(value);
        }
        if components.len() > 4 {
            return Err(invalid("at most four components are allowed").into());
        }

        Ok(Self {
            major: components[0],
            minor: components.get(1).copied().unwrap_or(0),
            build: components.get(2).copied(),
            revision: components.get(3).copied(),
        })
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Build component, `None` when undefined.
    #[must_use]
    pub const fn build(&self) -> Option<u32> {
        self.build
    }

    /// Revision component, `None` when undefined.
    #[must_use]
    pub const fn revision(&self) -> Option<u32> {
        self.revision
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.build.cmp(&other.build))
            .then(self.revision.cmp(&other.revision))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&semver::Version> for Version {
    fn from(version: &semver::Version) -> Self {
        // Components beyond u32 are clamped; package versions never get there.
        let clamp = |value: u64| u32::try_from(value).unwrap_or(u32::MAX);
        Self::with_build(clamp(version.major), clamp(version.minor), clamp(version.patch))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
