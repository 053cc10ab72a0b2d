//! Pane layout settings and their YAML persistence.
//!
//! Covers:
//! - `LayoutConfig` fields and defaults
//! - `load_from` / `save_to` (YAML file I/O with atomic write)
//! - `validate` for semantic checks after parsing

use crate::defaults;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings consumed by the pane container and the workspace facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Quiet period after the last active-item change before the
    /// "stopped changing" notification is delivered.
    #[serde(default = "defaults::stop_changing_delay_ms")]
    pub stop_changing_delay_ms: u64,

    /// Destroy a pane once its last item has been destroyed
    /// (the last remaining pane of a container is always kept).
    #[serde(default = "defaults::destroy_empty_panes")]
    pub destroy_empty_panes: bool,

    /// Seed new split panes with a copy of the active item when the caller
    /// does not say otherwise.
    #[serde(default = "defaults::copy_active_item_on_split")]
    pub copy_active_item_on_split: bool,

    /// Named workspace region that owns the container.
    #[serde(default = "defaults::location")]
    pub location: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stop_changing_delay_ms: defaults::stop_changing_delay_ms(),
            destroy_empty_panes: defaults::destroy_empty_panes(),
            copy_active_item_on_split: defaults::copy_active_item_on_split(),
            location: defaults::location(),
        }
    }
}

impl LayoutConfig {
    /// Debounce window as a `Duration`.
    pub fn stop_changing_delay(&self) -> Duration {
        Duration::from_millis(self.stop_changing_delay_ms)
    }

    /// Check field values that parse correctly but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stop_changing_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "stop_changing_delay_ms must be greater than zero".to_string(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(ConfigError::Validation(
                "location must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a specific file
    ///
    /// Returns `None` if the file doesn't exist or is empty.
    /// Returns an error if the file exists but is corrupt or invalid.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            log::info!("Layout config {:?} not found, using defaults", path);
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        let config: LayoutConfig = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;

        log::info!("Loaded layout config from {:?}", path);
        Ok(Some(config))
    }

    /// Load configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load_from(path)?.unwrap_or_default())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        log::debug!("Saved layout config to {:?}", path);
        Ok(())
    }
}
