//! Configuration loader for environment variables and files.
//!
//! Responsibilities:
//! - Load configuration from `.env` files, environment variables, and a JSON config file.
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - Reading or writing user preferences (see `persistence`).
//!
//! Invariants / Assumptions:
//! - Builder overrides > environment variables > config file > defaults.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

mod builder;
mod env;
mod error;
mod file;

pub use builder::ConfigLoader;
pub use env::{
    ENV_BASE_PATH, ENV_CONFIG_PATH, ENV_EVENT_NAMESPACE, ENV_GRID_COLUMNS, ENV_PREFERENCES_PATH,
    ENV_ROUTE_DEBOUNCE_MS, ENV_SEARCH_DEBOUNCE_MS, ENV_TELEMETRY, ENV_USAGE_REPORT_DEBOUNCE_MS,
    env_var_or_none,
};
pub use error::ConfigError;

#[cfg(test)]
mod tests;
