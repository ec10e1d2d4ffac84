//! One-line text form of a [`PackageDependency`].
//!
//! ```text
//! <name> [<vertex> (and <vertex>)*] [anchored] [content]
//! ```
//!
//! where a vertex is `*`, `= v`, `>= v`, `< v`, `~> v`, or a bare version (read
//! as `= v`). Operators may be attached to the version (`>=2.0`) and vertices
//! may also be separated by commas.

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

use super::PackageDependency;
use crate::core::PackageError;
use crate::models::validate_package_name;
use crate::version::{Version, VersionVertex};

const OPERATORS: [&str; 4] = [">=", "<", "=", "~>"];

impl PackageDependency {
    /// Parses the one-line text form.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidDependencySpec`] for an invalid name, an
    /// operator without a version, or an unrecognised token.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: String| PackageError::InvalidDependencySpec {
            spec: spec.to_string(),
            reason,
        };

        let mut tokens = spec
            .split_whitespace()
            .map(|t| t.trim_end_matches(','))
            .filter(|t| !t.is_empty())
            .peekable();

        let name = tokens.next().ok_or_else(|| invalid("dependency is empty".to_string()))?;
        validate_package_name(name).map_err(|e| invalid(e.to_string()))?;
        let mut dependency = Self::new(name);

        while let Some(token) = tokens.next() {
            match token {
                "and" => {}
                "anchored" => dependency.anchored = true,
                "content" => dependency.content_only = true,
                "*" => dependency.constraints.push(VersionVertex::Any),
                op if OPERATORS.contains(&op) => {
                    let version = tokens
                        .next()
                        .ok_or_else(|| invalid(format!("operator '{op}' is missing a version")))?;
                    let vertex = VersionVertex::parse(&format!("{op} {version}"))
                        .map_err(|e| invalid(e.to_string()))?;
                    dependency.constraints.push(vertex);
                }
                attached if attached.starts_with(['>', '<', '=', '~']) => {
                    let vertex = VersionVertex::parse(attached).map_err(|e| invalid(e.to_string()))?;
                    dependency.constraints.push(vertex);
                }
                other => {
                    let version = Version::parse(other)
                        .map_err(|_| invalid(format!("unexpected token '{other}'")))?;
                    dependency.constraints.push(VersionVertex::Equal(version));
                }
            }
        }

        Ok(dependency)
    }
}

impl FromStr for PackageDependency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.constraints.is_empty() {
            write!(f, " {}", self.constraints)?;
        }
        if self.anchored {
            f.write_str(" anchored")?;
        }
        if self.content_only {
            f.write_str(" content")?;
        }
        Ok(())
    }
}
