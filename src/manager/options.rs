//! Per-operation option sets.
//!
//! Every set deserializes with kebab-case keys and falls back to its
//! [`Default`] for missing fields, so they can be embedded directly in
//! [`ManagerConfig`](crate::config::ManagerConfig).

use serde::{Deserialize, Serialize};

/// Options for adding a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AddOptions {
    /// Fire lifecycle hooks once the add succeeded.
    pub hooks: bool,
    /// Mark the new dependency anchored.
    pub anchor: bool,
    /// Mark the new dependency content-only.
    pub content: bool,
    /// Write the edited dependency list back into the caller's descriptor.
    ///
    /// When off, the edit is applied to a copy that only drives this run.
    pub update_descriptor: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            hooks: true,
            anchor: false,
            content: false,
            update_descriptor: true,
        }
    }
}

impl AddOptions {
    /// Sets [`anchor`](Self::anchor).
    #[must_use]
    pub const fn anchored(mut self, anchor: bool) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets [`content`](Self::content).
    #[must_use]
    pub const fn content_only(mut self, content: bool) -> Self {
        self.content = content;
        self
    }

    /// Sets [`hooks`](Self::hooks).
    #[must_use]
    pub const fn with_hooks(mut self, hooks: bool) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets [`update_descriptor`](Self::update_descriptor).
    #[must_use]
    pub const fn updating_descriptor(mut self, update_descriptor: bool) -> Self {
        self.update_descriptor = update_descriptor;
        self
    }
}

/// Options for updating packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UpdateOptions {
    /// Fire lifecycle hooks once the update succeeded.
    pub hooks: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { hooks: true }
    }
}

/// Options for removing a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RemoveOptions {
    /// Fire lifecycle hooks once the removal succeeded.
    pub hooks: bool,
    /// After dropping a descriptor entry, clean the project repository for
    /// that name.
    pub clean: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self {
            hooks: true,
            clean: false,
        }
    }
}

impl RemoveOptions {
    /// Sets [`clean`](Self::clean).
    #[must_use]
    pub const fn cleaning(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

/// Options for cleaning a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CleanOptions {
    /// Fire lifecycle hooks once the clean succeeded.
    pub hooks: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self { hooks: true }
    }
}

/// Options for listing packages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ListOptions {
    /// Report only the newest instance of each name per repository.
    pub latest_only: bool,
}
