//! Lifecycle hooks fired when the package set of a repository changes.
//!
//! Callbacks are registered per [`HookScope`] and [`PackageChange`] in a
//! [`HookRegistry`]; the scope is stored next to the callback rather than
//! captured by it. Operations run with hooks enabled wrap their result stream
//! in a [`HookedStream`], which:
//!
//! - snapshots the package set before the first result is produced,
//! - forwards every base result unchanged,
//! - and, only if the base stream produced at least one result and all of
//!   them succeeded, snapshots again, diffs by name and invokes the matching
//!   callbacks (removed, then added, then updated).
//!
//! Each value a callback returns is emitted as an
//! [`OperationResult::HookOutput`](crate::operation::OperationResult::HookOutput).
//!
//! ```rust,no_run
//! use packsync::hooks::{HookRegistry, HookScope};
//! use serde_json::json;
//!
//! let mut hooks = HookRegistry::new();
//! hooks.on_install(HookScope::Project, |invocation| {
//!     Ok(vec![json!({ "installed": invocation.name })])
//! });
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::constants::{PROJECT_SCOPE, SYSTEM_SCOPE};
use crate::models::PackageInfo;
use crate::version::Version;

mod diff;
mod stream;

pub use diff::{PackageDiff, diff_packages};
pub use stream::{HookedStream, Snapshot};

/// Which store a hook invocation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookScope {
    /// The project repository.
    Project,
    /// The system repository.
    System,
}

impl HookScope {
    /// Scope label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Project => PROJECT_SCOPE,
            Self::System => SYSTEM_SCOPE,
        }
    }
}

impl fmt::Display for HookScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a package changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageChange {
    /// Present after, absent before.
    Installed,
    /// Present in both with a different version.
    Updated,
    /// Present before, absent after.
    Removed,
}

impl fmt::Display for PackageChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Installed => "installed",
            Self::Updated => "updated",
            Self::Removed => "removed",
        };
        f.write_str(text)
    }
}

/// Arguments passed to a hook callback.
#[derive(Debug, Clone)]
pub struct HookInvocation {
    /// Scope the hook was registered for.
    pub scope: HookScope,
    /// Repository whose package set changed.
    pub repository: String,
    /// Package name.
    pub name: String,
    /// Kind of change.
    pub change: PackageChange,
    /// Version before the change, `None` when installed.
    pub previous: Option<Version>,
    /// Version after the change, `None` when removed.
    pub current: Option<Version>,
    /// The whole package set after the change, or before it for removals.
    pub packages: Vec<PackageInfo>,
}

/// A hook callback: zero or more opaque outputs per invocation.
pub type HookFn = Arc<dyn Fn(&HookInvocation) -> Result<Vec<Value>> + Send + Sync>;

#[derive(Clone)]
struct RegisteredHook {
    scope: HookScope,
    change: PackageChange,
    callback: HookFn,
}

/// Registered hook callbacks, kept in registration order.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<RegisteredHook>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `change` events in `scope`.
    pub fn register<F>(&mut self, scope: HookScope, change: PackageChange, callback: F) -> &mut Self
    where
        F: Fn(&HookInvocation) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.hooks.push(RegisteredHook {
            scope,
            change,
            callback: Arc::new(callback),
        });
        self
    }

    /// Registers an install callback.
    pub fn on_install<F>(&mut self, scope: HookScope, callback: F) -> &mut Self
    where
        F: Fn(&HookInvocation) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.register(scope, PackageChange::Installed, callback)
    }

    /// Registers an update callback.
    pub fn on_update<F>(&mut self, scope: HookScope, callback: F) -> &mut Self
    where
        F: Fn(&HookInvocation) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.register(scope, PackageChange::Updated, callback)
    }

    /// Registers a removal callback.
    pub fn on_remove<F>(&mut self, scope: HookScope, callback: F) -> &mut Self
    where
        F: Fn(&HookInvocation) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.register(scope, PackageChange::Removed, callback)
    }

    /// Callbacks for `scope` and `change`, in registration order.
    pub fn callbacks(&self, scope: HookScope, change: PackageChange) -> impl Iterator<Item = &HookFn> {
        self.hooks
            .iter()
            .filter(move |h| h.scope == scope && h.change == change)
            .map(|h| &h.callback)
    }

    /// Whether any callback is registered for `scope`.
    #[must_use]
    pub fn has_hooks_for(&self, scope: HookScope) -> bool {
        self.hooks.iter().any(|h| h.scope == scope)
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry").field("hooks", &self.hooks.len()).finish()
    }
}
