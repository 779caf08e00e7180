//! Basic loader tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test defaults when no layer sets a value.
//! - Test builder overrides.
//! - Test validation of debounce windows, grid columns, namespaces and base paths.

use std::time::Duration;

use crate::loader::builder::{ConfigLoader, normalize_base_path};
use crate::loader::error::ConfigError;

#[test]
fn test_defaults_without_layers() {
    let config = ConfigLoader::new().build().unwrap();
    assert_eq!(config.search_debounce, Duration::from_millis(300));
    assert_eq!(config.usage_report_debounce, Duration::from_millis(5000));
    assert_eq!(config.event_namespace, "dashbrowse_search");
    assert!(config.telemetry_enabled);
}

#[test]
fn test_builder_overrides() {
    let config = ConfigLoader::new()
        .with_base_path("grafana/")
        .with_search_debounce_ms(50)
        .with_route_debounce_ms(75)
        .with_grid_columns(6)
        .with_telemetry_enabled(false)
        .build()
        .unwrap();
    assert_eq!(config.base_path, "/grafana");
    assert_eq!(config.search_debounce, Duration::from_millis(50));
    assert_eq!(config.route_debounce, Duration::from_millis(75));
    assert_eq!(config.grid_columns, 6);
    assert!(!config.telemetry_enabled);
}

#[test]
fn test_debounce_upper_bound() {
    let result = ConfigLoader::new().with_search_debounce_ms(60_000).build();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref var, .. }) if var == "search_debounce_ms"
    ));
}

#[test]
fn test_zero_grid_columns_rejected() {
    let result = ConfigLoader::new().with_grid_columns(0).build();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_namespace_validation() {
    assert!(
        ConfigLoader::new()
            .with_event_namespace("browse_dashboards")
            .build()
            .is_ok()
    );
    assert!(
        ConfigLoader::new()
            .with_event_namespace("Bad Namespace")
            .build()
            .is_err()
    );
}

#[test]
fn test_normalize_base_path() {
    assert_eq!(normalize_base_path("").unwrap(), "");
    assert_eq!(normalize_base_path("/").unwrap(), "");
    assert_eq!(normalize_base_path("/grafana/").unwrap(), "/grafana");
    assert_eq!(normalize_base_path("a/b").unwrap(), "/a/b");
    assert!(normalize_base_path("https://host/grafana").is_err());
}
