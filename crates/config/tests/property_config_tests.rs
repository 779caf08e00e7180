//! Property-based tests for configuration loading.
//!
//! Test coverage:
//! - ConfigSettings: file format roundtrip
//! - ConfigLoader: base path normalization always yields "" or "/segment..."
//! - ConfigLoader: debounce bounds are enforced

use proptest::prelude::*;
use std::time::Duration;

use dashbrowse_config::constants::MAX_DEBOUNCE_MS;
use dashbrowse_config::{ConfigLoader, ConfigSettings};

fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn base_path_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(segment_strategy(), 0..4),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(segments, leading, trailing)| {
            let mut path = segments.join("/");
            if leading {
                path.insert(0, '/');
            }
            if trailing {
                path.push('/');
            }
            path
        })
}

proptest! {
    #[test]
    fn settings_roundtrip_through_json(
        base_path in proptest::option::of(base_path_strategy()),
        search in proptest::option::of(0u64..20_000),
        grid in proptest::option::of(1usize..100),
        telemetry in proptest::option::of(any::<bool>()),
    ) {
        let settings = ConfigSettings {
            base_path,
            search_debounce_ms: search,
            grid_columns: grid,
            telemetry_enabled: telemetry,
            ..ConfigSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: ConfigSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn base_path_is_normalized(raw in base_path_strategy()) {
        let config = ConfigLoader::new().with_base_path(raw.clone()).build().unwrap();
        let path = config.base_path;
        prop_assert!(path.is_empty() || path.starts_with('/'));
        prop_assert!(!path.ends_with('/'));
        prop_assert_eq!(path.trim_start_matches('/'), raw.trim_matches('/'));
    }

    #[test]
    fn debounce_bounds_enforced(ms in 0u64..(MAX_DEBOUNCE_MS * 2)) {
        let result = ConfigLoader::new().with_search_debounce_ms(ms).build();
        if ms <= MAX_DEBOUNCE_MS {
            prop_assert_eq!(result.unwrap().search_debounce, Duration::from_millis(ms));
        } else {
            prop_assert!(result.is_err());
        }
    }
}
