//! Configuration management for dashbrowse.
//!
//! This crate provides the layered runtime configuration (defaults, config
//! file, environment, explicit overrides) and the key-value preference store
//! that remembers layout and sort choices between sessions.

pub mod constants;
mod loader;
pub mod persistence;
pub mod types;

pub use loader::{
    ConfigError, ConfigLoader, ENV_BASE_PATH, ENV_CONFIG_PATH, ENV_EVENT_NAMESPACE,
    ENV_GRID_COLUMNS, ENV_PREFERENCES_PATH, ENV_ROUTE_DEBOUNCE_MS, ENV_SEARCH_DEBOUNCE_MS,
    ENV_TELEMETRY, ENV_USAGE_REPORT_DEBOUNCE_MS, env_var_or_none,
};
pub use persistence::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore,
    default_config_path, default_preferences_path,
};
pub use types::{BrowseConfig, ConfigSettings};

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, OnceLock};

    pub fn global_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }
}
