//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Validate and normalize the merged layers into a `BrowseConfig`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Config file parsing (delegated to file.rs).
//! - Preference persistence (see persistence).
//!
//! Invariants / Assumptions:
//! - Precedence: builder overrides > environment > config file > defaults,
//!   independent of the order `from_file` / `from_env` are called in.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::path::PathBuf;
use std::time::Duration;

use super::env::{ENV_CONFIG_PATH, env_var_or_none, read_env};
use super::error::ConfigError;
use super::file::read_settings_file;
use crate::constants::{MAX_DEBOUNCE_MS, MAX_GRID_COLUMNS};
use crate::types::{BrowseConfig, ConfigSettings};

/// Configuration loader that merges file, environment and explicit overrides.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    overrides: ConfigSettings,
    env: ConfigSettings,
    file: ConfigSettings,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Use an explicit config file. An explicit file must exist.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.overrides.base_path = Some(base_path.into());
        self
    }

    pub fn with_search_debounce_ms(mut self, ms: u64) -> Self {
        self.overrides.search_debounce_ms = Some(ms);
        self
    }

    pub fn with_route_debounce_ms(mut self, ms: u64) -> Self {
        self.overrides.route_debounce_ms = Some(ms);
        self
    }

    pub fn with_usage_report_debounce_ms(mut self, ms: u64) -> Self {
        self.overrides.usage_report_debounce_ms = Some(ms);
        self
    }

    pub fn with_event_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.overrides.event_namespace = Some(namespace.into());
        self
    }

    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.overrides.grid_columns = Some(columns);
        self
    }

    pub fn with_preferences_path(mut self, path: PathBuf) -> Self {
        self.overrides.preferences_path = Some(path);
        self
    }

    pub fn with_telemetry_enabled(mut self, enabled: bool) -> Self {
        self.overrides.telemetry_enabled = Some(enabled);
        self
    }

    /// Read the config file layer.
    ///
    /// The path comes from `with_config_path`, then `DASHBROWSE_CONFIG_PATH`.
    /// Without either, this is a no-op.
    pub fn from_file(mut self) -> Result<Self, ConfigError> {
        let path = self
            .config_path
            .clone()
            .or_else(|| env_var_or_none(ENV_CONFIG_PATH).map(PathBuf::from));
        if let Some(path) = path {
            self.file = read_settings_file(&path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
        }
        Ok(self)
    }

    /// Read the environment layer.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        self.env = read_env()?;
        Ok(self)
    }

    /// Merge all layers and validate the result.
    pub fn build(self) -> Result<BrowseConfig, ConfigError> {
        let merged = self.overrides.or(self.env).or(self.file);
        let defaults = BrowseConfig::default();

        let base_path = match merged.base_path {
            Some(raw) => normalize_base_path(&raw)?,
            None => defaults.base_path,
        };

        let search_debounce = debounce("search_debounce_ms", merged.search_debounce_ms)?
            .unwrap_or(defaults.search_debounce);
        let route_debounce = debounce("route_debounce_ms", merged.route_debounce_ms)?
            .unwrap_or(defaults.route_debounce);
        let usage_report_debounce =
            debounce("usage_report_debounce_ms", merged.usage_report_debounce_ms)?
                .unwrap_or(defaults.usage_report_debounce);

        let event_namespace = match merged.event_namespace {
            Some(ns) => validate_namespace(ns)?,
            None => defaults.event_namespace,
        };

        let grid_columns = merged.grid_columns.unwrap_or(defaults.grid_columns);
        if grid_columns == 0 || grid_columns > MAX_GRID_COLUMNS {
            return Err(ConfigError::invalid(
                "grid_columns",
                format!("must be between 1 and {MAX_GRID_COLUMNS}"),
            ));
        }

        Ok(BrowseConfig {
            base_path,
            search_debounce,
            route_debounce,
            usage_report_debounce,
            event_namespace,
            grid_columns,
            preferences_path: merged.preferences_path,
            telemetry_enabled: merged
                .telemetry_enabled
                .unwrap_or(defaults.telemetry_enabled),
        })
    }
}

fn debounce(var: &str, ms: Option<u64>) -> Result<Option<Duration>, ConfigError> {
    match ms {
        Some(ms) if ms > MAX_DEBOUNCE_MS => Err(ConfigError::invalid(
            var,
            format!("must be at most {MAX_DEBOUNCE_MS} ms"),
        )),
        Some(ms) => Ok(Some(Duration::from_millis(ms))),
        None => Ok(None),
    }
}

/// Normalize a base path to "" or "/segment[/segment...]" without a trailing slash.
pub(crate) fn normalize_base_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains("://") || trimmed.contains(['?', '#']) {
        return Err(ConfigError::invalid(
            "base_path",
            "must be a path such as /grafana, not a url",
        ));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

fn validate_namespace(ns: String) -> Result<String, ConfigError> {
    let valid = !ns.is_empty()
        && ns
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(ns)
    } else {
        Err(ConfigError::invalid(
            "event_namespace",
            "must be non-empty lowercase letters, digits or underscores",
        ))
    }
}
