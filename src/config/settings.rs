//! User settings for costbook
//!
//! Manages user preferences: currency symbol and date formatting. Fields
//! missing from older config files deserialize to their defaults.

use serde::{Deserialize, Serialize};

use super::paths::CostbookPaths;
use crate::error::CostbookError;

/// User settings for costbook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Currency symbol used when presenting money
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults when no config
    /// file exists yet. Does not write anything; the caller decides when
    /// to persist.
    pub fn load_or_create(paths: &CostbookPaths) -> Result<Self, CostbookError> {
        let path = paths.settings_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| CostbookError::Io(format!("Failed to read settings file: {}", e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| CostbookError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk, creating the config directory if needed
    pub fn save(&self, paths: &CostbookPaths) -> Result<(), CostbookError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CostbookError::Config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CostbookError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
