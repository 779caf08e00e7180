//! Centralized constants for the dashbrowse workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Debounce Defaults
// =============================================================================

/// Default delay before a burst of query edits triggers a backend search.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Default delay before a burst of query edits is written to the route.
pub const DEFAULT_ROUTE_DEBOUNCE_MS: u64 = 300;

/// Default delay before search usage is reported to the interaction sink.
pub const DEFAULT_USAGE_REPORT_DEBOUNCE_MS: u64 = 5000;

/// Maximum allowed debounce window for any debounced effect.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

// =============================================================================
// Layout & Navigation Defaults
// =============================================================================

/// Default number of columns in the grid layout.
pub const DEFAULT_GRID_COLUMNS: usize = 4;

/// Maximum number of columns in the grid layout.
pub const MAX_GRID_COLUMNS: usize = 64;

/// Capacity of the navigation intent broadcast channel.
///
/// A subscriber that falls further behind than this skips the oldest intents.
pub const DEFAULT_NAVIGATION_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Telemetry Defaults
// =============================================================================

/// Default prefix for interaction event names.
pub const DEFAULT_EVENT_NAMESPACE: &str = "dashbrowse_search";

// =============================================================================
// Preference Keys
// =============================================================================

/// Preference key for the last selected layout.
pub const PREF_SEARCH_LAYOUT: &str = "dashbrowse.search.layout";

/// Preference key for the last selected sort.
pub const PREF_SEARCH_SORT: &str = "dashbrowse.search.sort";

/// Preference key for whether sub-items (panels) are included in results.
pub const PREF_SEARCH_INCLUDE_SUB_ITEMS: &str = "dashbrowse.search.include_sub_items";
