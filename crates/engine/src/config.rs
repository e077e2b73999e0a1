//! Adapter configuration via `docwrite.toml`
//!
//! Every key is optional; an empty file gives the strict defaults.

use crate::filter::FilterStrategy;
use crate::policy::{ReconcilePolicy, UnmatchedPolicy, UpdateMode};
use crate::reconcile::WriteSettings;
use docwrite_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "docwrite.toml";

/// Adapter configuration loaded from `docwrite.toml`.
///
/// # Example
///
/// ```toml
/// # Update mode: "auto" (default), "diff" or "replace"
/// mode = "diff"
///
/// # Unmatched writes: "fail" (default) or "orphan"
/// on_unmatched_update = "fail"
/// on_unmatched_delete = "orphan"
///
/// upsert = false
/// version_field = "rev"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Update mode: `"auto"`, `"diff"` or `"replace"`.
    #[serde(default)]
    pub mode: UpdateMode,
    /// Unmatched updates: `"fail"` or `"orphan"`.
    #[serde(default)]
    pub on_unmatched_update: UnmatchedPolicy,
    /// Unmatched deletes: `"fail"` or `"orphan"`.
    #[serde(default)]
    pub on_unmatched_delete: UnmatchedPolicy,
    /// Upsert updates and replaces that match nothing.
    #[serde(default)]
    pub upsert: bool,
    /// Version field added to identifying filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_field: Option<String>,
}

impl AdapterConfig {
    /// Build the reconcile policy.
    pub fn to_policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            mode: self.mode,
            on_unmatched_update: self.on_unmatched_update,
            on_unmatched_delete: self.on_unmatched_delete,
        }
    }

    /// Build full write settings: policy, filter strategy and upsert default.
    pub fn to_settings(&self) -> Result<WriteSettings> {
        let filter = match &self.version_field {
            Some(field) if field.is_empty() => {
                return Err(Error::Config("version_field must not be empty".to_string()))
            }
            Some(field) => FilterStrategy::versioned(field.as_str()),
            None => FilterStrategy::ById,
        };
        Ok(WriteSettings::default()
            .with_policy(self.to_policy())
            .with_filter(filter)
            .with_upsert(self.upsert))
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docwrite adapter configuration
#
# Update mode: "auto" (default), "diff" or "replace"
#   "diff"    = send only changed paths ($set / $unset)
#   "replace" = overwrite the whole document
#   "auto"    = diff inside a session or with a custom filter, else replace
mode = "auto"

# What to do when a write matches nothing: "fail" (default) or "orphan"
on_unmatched_update = "fail"
on_unmatched_delete = "fail"

# Insert when an update or replace matches nothing (default: false)
upsert = false

# Version field added to identifying filters, to detect stale writes.
# version_field = "rev"
"#
    }

    /// Parse config from a TOML string and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AdapterConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.to_settings()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
