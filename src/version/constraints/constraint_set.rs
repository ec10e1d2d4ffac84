//! Constraint set implementation for combining vertices on one dependency.

use std::fmt;

use super::VersionVertex;
use crate::version::Version;

/// A collection of version vertices that must all be satisfied simultaneously.
///
/// An empty set accepts every version, the same as a set holding only
/// [`VersionVertex::Any`].
///
/// ```rust,no_run
/// use packsync::version::{ConstraintSet, Version, VersionVertex};
///
/// let mut set = ConstraintSet::new();
/// set.push(VersionVertex::GreaterOrEqual(Version::parse("1.0.0")?));
/// set.push(VersionVertex::LessThan(Version::parse("3.0.0")?));
///
/// let versions = [
///     Version::parse("1.0.0")?,
///     Version::parse("2.0.0")?,
///     Version::parse("3.0.0")?,
/// ];
/// assert_eq!(set.find_best_match(&versions), Some(&versions[1]));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConstraintSet {
    vertices: Vec<VersionVertex>,
}

impl ConstraintSet {
    /// Creates an empty constraint set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    /// Adds a vertex; duplicates are ignored.
    pub fn push(&mut self, vertex: VersionVertex) {
        if !self.vertices.contains(&vertex) {
            self.vertices.push(vertex);
        }
    }

    /// Checks if a version satisfies every vertex in this set.
    #[must_use]
    pub fn satisfies(&self, version: &Version) -> bool {
        self.vertices.iter().all(|v| v.is_compatible_with(version))
    }

    /// Selects the highest version satisfying the whole set.
    #[must_use]
    pub fn find_best_match<'a>(&self, versions: &'a [Version]) -> Option<&'a Version> {
        versions.iter().filter(|v| self.satisfies(v)).max()
    }

    /// Returns the exact version pinned by an [`VersionVertex::Equal`] vertex, if any.
    #[must_use]
    pub fn exact_version(&self) -> Option<&Version> {
        self.vertices.iter().find_map(|v| match v {
            VersionVertex::Equal(version) => Some(version),
            _ => None,
        })
    }

    /// Returns `true` when no version can ever satisfy the set.
    ///
    /// Only obvious contradictions are detected: two different exact versions,
    /// or an exact version rejected by another vertex.
    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        let mut exact = self.vertices.iter().filter_map(|v| match v {
            VersionVertex::Equal(version) => Some(version),
            _ => None,
        });
        match exact.next() {
            Some(first) => exact.any(|other| other != first) || !self.satisfies(first),
            None => false,
        }
    }

    /// Iterates over the vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &VersionVertex> {
        self.vertices.iter()
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the set holds no vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl FromIterator<VersionVertex> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = VersionVertex>>(iter: I) -> Self {
        let mut set = Self::new();
        for vertex in iter {
            set.push(vertex);
        }
        set
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vertices.is_empty() {
            return f.write_str("*");
        }
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{vertex}")?;
        }
        Ok(())
    }
}
