//! Reading and writing descriptor files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{PackageDependency, PackageDescriptor};
use crate::core::PackageError;

/// On-disk layout of a descriptor file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DescriptorFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    depends: Vec<String>,
}

impl PackageDescriptor {
    /// Parses descriptor TOML text.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::DescriptorParseError`] for invalid TOML, an
    /// invalid dependency line, or two dependencies with the same name.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        let parse_error = |reason: String| PackageError::DescriptorParseError {
            file: origin.to_string(),
            reason,
        };

        let file: DescriptorFile =
            toml::from_str(content).map_err(|e| parse_error(e.message().to_string()))?;

        let mut descriptor = Self {
            name: file.name,
            dependencies: Vec::with_capacity(file.depends.len()),
        };
        for line in &file.depends {
            let dependency = PackageDependency::parse(line).map_err(|e| parse_error(e.to_string()))?;
            if descriptor.contains(dependency.name()) {
                return Err(parse_error(format!(
                    "dependency '{}' is declared more than once",
                    dependency.name()
                ))
                .into());
            }
            descriptor.dependencies.push(dependency);
        }
        Ok(descriptor)
    }

    /// Renders the descriptor as TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        let file = DescriptorFile {
            name: self.name.clone(),
            depends: self.dependencies.iter().map(ToString::to_string).collect(),
        };
        Ok(toml::to_string_pretty(&file).map_err(PackageError::from)?)
    }

    /// Loads a descriptor file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor file: {}", path.display()))?;
        let descriptor = Self::from_toml_str(&content, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            dependencies = descriptor.len(),
            "Loaded package descriptor"
        );
        Ok(descriptor)
    }

    /// Writes the descriptor to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write descriptor file: {}", path.display()))?;
        Ok(())
    }
}
