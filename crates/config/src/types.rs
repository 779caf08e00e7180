//! Configuration types.
//!
//! Responsibilities:
//! - Define the resolved runtime configuration (`BrowseConfig`).
//! - Define the partial settings layer shared by the config file, environment
//!   and builder overrides (`ConfigSettings`).
//!
//! Does NOT handle:
//! - Reading any source (see `loader`).
//! - Validation (performed once, in `ConfigLoader::build`).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EVENT_NAMESPACE, DEFAULT_GRID_COLUMNS, DEFAULT_ROUTE_DEBOUNCE_MS,
    DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_USAGE_REPORT_DEBOUNCE_MS,
};

/// Resolved configuration for one browsing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseConfig {
    /// Application base path stripped from navigation urls ("" or "/prefix").
    pub base_path: String,
    pub search_debounce: Duration,
    pub route_debounce: Duration,
    pub usage_report_debounce: Duration,
    /// Prefix for interaction event names.
    pub event_namespace: String,
    pub grid_columns: usize,
    /// Where layout/sort preferences live; `None` uses the platform default.
    pub preferences_path: Option<PathBuf>,
    pub telemetry_enabled: bool,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            route_debounce: Duration::from_millis(DEFAULT_ROUTE_DEBOUNCE_MS),
            usage_report_debounce: Duration::from_millis(DEFAULT_USAGE_REPORT_DEBOUNCE_MS),
            event_namespace: DEFAULT_EVENT_NAMESPACE.to_string(),
            grid_columns: DEFAULT_GRID_COLUMNS,
            preferences_path: None,
            telemetry_enabled: true,
        }
    }
}

/// One layer of partially specified settings.
///
/// This is also the on-disk config file format; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSettings {
    pub base_path: Option<String>,
    pub search_debounce_ms: Option<u64>,
    pub route_debounce_ms: Option<u64>,
    pub usage_report_debounce_ms: Option<u64>,
    pub event_namespace: Option<String>,
    pub grid_columns: Option<usize>,
    pub preferences_path: Option<PathBuf>,
    pub telemetry_enabled: Option<bool>,
}

impl ConfigSettings {
    /// Fill every unset field of `self` from `lower`.
    pub fn or(self, lower: ConfigSettings) -> ConfigSettings {
        ConfigSettings {
            base_path: self.base_path.or(lower.base_path),
            search_debounce_ms: self.search_debounce_ms.or(lower.search_debounce_ms),
            route_debounce_ms: self.route_debounce_ms.or(lower.route_debounce_ms),
            usage_report_debounce_ms: self
                .usage_report_debounce_ms
                .or(lower.usage_report_debounce_ms),
            event_namespace: self.event_namespace.or(lower.event_namespace),
            grid_columns: self.grid_columns.or(lower.grid_columns),
            preferences_path: self.preferences_path.or(lower.preferences_path),
            telemetry_enabled: self.telemetry_enabled.or(lower.telemetry_enabled),
        }
    }
}
