//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `DASHBROWSE_*` environment variables into a settings layer.
//! - Provide helper functions for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Loading from the config file (see file.rs).
//! - Validating ranges (see builder.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Unparseable values return ConfigError::InvalidValue naming the variable.

use std::path::PathBuf;
use std::str::FromStr;

use super::error::ConfigError;
use crate::types::ConfigSettings;

pub const ENV_BASE_PATH: &str = "DASHBROWSE_BASE_PATH";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "DASHBROWSE_SEARCH_DEBOUNCE_MS";
pub const ENV_ROUTE_DEBOUNCE_MS: &str = "DASHBROWSE_ROUTE_DEBOUNCE_MS";
pub const ENV_USAGE_REPORT_DEBOUNCE_MS: &str = "DASHBROWSE_USAGE_REPORT_DEBOUNCE_MS";
pub const ENV_EVENT_NAMESPACE: &str = "DASHBROWSE_EVENT_NAMESPACE";
pub const ENV_GRID_COLUMNS: &str = "DASHBROWSE_GRID_COLUMNS";
pub const ENV_PREFERENCES_PATH: &str = "DASHBROWSE_PREFERENCES_PATH";
pub const ENV_TELEMETRY: &str = "DASHBROWSE_TELEMETRY";
pub const ENV_CONFIG_PATH: &str = "DASHBROWSE_CONFIG_PATH";

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_var<T: FromStr>(key: &str, message: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| raw.parse::<T>().map_err(|_| ConfigError::invalid(key, message)))
        .transpose()
}

fn parse_bool_var(key: &str) -> Result<Option<bool>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::invalid(key, "must be true or false")),
        })
        .transpose()
}

/// Read the environment into a settings layer.
pub fn read_env() -> Result<ConfigSettings, ConfigError> {
    Ok(ConfigSettings {
        base_path: env_var_or_none(ENV_BASE_PATH),
        search_debounce_ms: parse_var(ENV_SEARCH_DEBOUNCE_MS, "must be a number of milliseconds")?,
        route_debounce_ms: parse_var(ENV_ROUTE_DEBOUNCE_MS, "must be a number of milliseconds")?,
        usage_report_debounce_ms: parse_var(
            ENV_USAGE_REPORT_DEBOUNCE_MS,
            "must be a number of milliseconds",
        )?,
        event_namespace: env_var_or_none(ENV_EVENT_NAMESPACE),
        grid_columns: parse_var(ENV_GRID_COLUMNS, "must be a positive integer")?,
        preferences_path: env_var_or_none(ENV_PREFERENCES_PATH).map(PathBuf::from),
        telemetry_enabled: parse_bool_var(ENV_TELEMETRY)?,
    })
}
