//! Path management for costbook
//!
//! All files live under one base directory, resolved in this order:
//!
//! 1. `COSTBOOK_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/costbook` or `~/.config/costbook`
//! 3. Windows: `%APPDATA%\costbook`
//!
//! Settings and the audit log sit at the top; the JSON data files sit
//! under `data/`.

use std::path::{Path, PathBuf};

use crate::error::CostbookError;

/// Manages all paths used by costbook
#[derive(Debug, Clone)]
pub struct CostbookPaths {
    base_dir: PathBuf,
}

impl CostbookPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory
    /// cannot be determined.
    pub fn new() -> Result<Self, CostbookError> {
        let base_dir = match std::env::var_os("COSTBOOK_DATA_DIR") {
            Some(custom) => PathBuf::from(custom),
            None => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use a fixed base directory instead of resolving one (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The base directory (~/.config/costbook/ or equivalent)
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The data directory holding the JSON files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Path to projects.json
    pub fn projects_file(&self) -> PathBuf {
        self.data_file("projects.json")
    }

    /// Path to ledgers.json (one cost hierarchy per project)
    pub fn ledgers_file(&self) -> PathBuf {
        self.data_file("ledgers.json")
    }

    /// Path to events.json (append-only financial events)
    pub fn events_file(&self) -> PathBuf {
        self.data_file("events.json")
    }

    /// Path to backstops.json
    pub fn backstops_file(&self) -> PathBuf {
        self.data_file("backstops.json")
    }

    fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    /// Create the base and data directories if they are missing
    pub fn ensure_directories(&self) -> Result<(), CostbookError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CostbookError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CostbookError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if costbook has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CostbookError> {
    // Unix: XDG_CONFIG_HOME when set, ~/.config otherwise
    let config_base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = std::env::var_os("HOME").ok_or_else(|| {
                CostbookError::Config("Could not determine home directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("costbook"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CostbookError> {
    let appdata = std::env::var_os("APPDATA")
        .ok_or_else(|| CostbookError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("costbook"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("COSTBOOK_DATA_DIR", temp_dir.path());

        let paths = CostbookPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        env::remove_var("COSTBOOK_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();
        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let paths = CostbookPaths::with_base_dir(base.to_path_buf());

        // Config and audit log at the top, data files below data/
        assert_eq!(paths.settings_file(), base.join("config.json"));
        assert_eq!(paths.audit_log(), base.join("audit.log"));
        for (got, name) in [
            (paths.projects_file(), "projects.json"),
            (paths.ledgers_file(), "ledgers.json"),
            (paths.events_file(), "events.json"),
            (paths.backstops_file(), "backstops.json"),
        ] {
            assert_eq!(got, base.join("data").join(name));
        }
    }
}
