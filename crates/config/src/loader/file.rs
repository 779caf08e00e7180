//! Config file reading.
//!
//! Responsibilities:
//! - Read the JSON config file into a settings layer.
//!
//! Does NOT handle:
//! - Choosing which file to read (see builder.rs).
//! - Writing the config file; it is user-maintained.

use std::path::Path;

use super::error::ConfigError;
use crate::types::ConfigSettings;

/// Read and parse a config file.
pub(crate) fn read_settings_file(path: &Path) -> Result<ConfigSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::ConfigFileParse {
        path: path.to_path_buf(),
        source,
    })
}
