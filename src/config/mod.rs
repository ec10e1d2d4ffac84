//! User configuration.
//!
//! The configuration file only holds default option sets for the package
//! manager operations. Every section and key is optional:
//!
//! ```toml
//! [add]
//! hooks = true
//! anchor = false
//! content = false
//! update-descriptor = true
//!
//! [update]
//! hooks = true
//!
//! [remove]
//! hooks = true
//! clean = true
//!
//! [clean]
//! hooks = false
//! ```
//!
//! **Location:** `$PACKSYNC_CONFIG_PATH` when set, otherwise
//! `~/.packsync/config.toml`. A missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use crate::core::PackageError;
use crate::manager::{AddOptions, CleanOptions, RemoveOptions, UpdateOptions};

/// Default options for each package manager operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ManagerConfig {
    /// Defaults for adding packages.
    pub add: AddOptions,
    /// Defaults for updating packages.
    pub update: UpdateOptions,
    /// Defaults for removing packages.
    pub remove: RemoveOptions,
    /// Defaults for cleaning repositories.
    pub clean: CleanOptions,
}

impl ManagerConfig {
    /// Loads the configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be determined, or if the file
    /// exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this structure.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = toml::from_str(&content).map_err(|e| PackageError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// The configuration path: `$PACKSYNC_CONFIG_PATH` or `~/.packsync/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset and the home directory cannot
    /// be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or_else(|| PackageError::ConfigError {
            message: "Unable to determine home directory".to_string(),
        })?;
        Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}
