//! Wildcard matching of package names for list queries.
//!
//! Queries use glob syntax and match case-insensitively against the whole
//! package name:
//!
//! - `*` matches any sequence of characters
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match one character from the set or range
//!
//! A query without wildcards matches only the exact name (ignoring case).

use anyhow::Result;
use glob::{MatchOptions, Pattern};

use crate::core::PackageError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled, case-insensitive wildcard query.
///
/// ```rust,no_run
/// use packsync::pattern::WildcardPattern;
///
/// let matcher = WildcardPattern::new("sau*")?;
/// assert!(matcher.matches("Sauron"));
/// assert!(!matcher.matches("frodo"));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: Pattern,
    original: String,
}

impl WildcardPattern {
    /// Compiles `query`.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidPattern`] for malformed glob syntax.
    pub fn new(query: &str) -> Result<Self> {
        let pattern = Pattern::new(query).map_err(|e| PackageError::InvalidPattern {
            pattern: query.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(Self {
            pattern,
            original: query.to_string(),
        })
    }

    /// Whether `name` matches the query.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(name, MATCH_OPTIONS)
    }

    /// The query as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }
}
