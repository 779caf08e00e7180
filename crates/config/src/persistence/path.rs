//! Path helpers for configuration and preference file locations.
//!
//! Responsibilities:
//! - Determine default file paths.
//! - Use `directories` crate for platform-appropriate paths.
//!
//! Does NOT handle:
//! - File I/O operations.

use std::path::PathBuf;

use crate::loader::ConfigError;

fn project_dirs() -> Result<directories::ProjectDirs, ConfigError> {
    directories::ProjectDirs::from("", "", "dashbrowse").ok_or_else(|| {
        ConfigError::ConfigDirUnavailable("no home directory for the current user".to_string())
    })
}

/// Returns the default path to the configuration file.
///
/// - Linux: `~/.config/dashbrowse/config.json`
/// - macOS: `~/Library/Application Support/dashbrowse/config.json`
/// - Windows: `%AppData%\dashbrowse\config\config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

/// Returns the default path to the preference store.
pub fn default_preferences_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("preferences.json"))
}
