//! Metrics collection for search dispatches and user interactions.
//!
//! This module provides metric names and a small collector for search
//! dispatches, including:
//! - Dispatch latency histograms
//! - Dispatch, stale-discard and error counters
//! - Error categorization
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (install a recorder in the binary)
//! - Interaction event payloads (see `dashbrowse-state` telemetry)
//!
//! # Invariants
//! - Label values come from fixed enums or event names, never from user text
//! - Metric recording is infallible and zero-cost without a recorder

use crate::error::ClientError;
use std::time::Duration;

/// Metric name for search dispatch duration histogram.
pub const METRIC_SEARCH_DURATION: &str = "dashbrowse_search_duration_seconds";

/// Metric name for total search dispatch counter.
pub const METRIC_SEARCHES_TOTAL: &str = "dashbrowse_searches_total";

/// Metric name for responses discarded because a newer dispatch exists.
pub const METRIC_STALE_RESPONSES_TOTAL: &str = "dashbrowse_stale_responses_total";

/// Metric name for failed search counter.
pub const METRIC_SEARCH_ERRORS_TOTAL: &str = "dashbrowse_search_errors_total";

/// Metric name for reported user interactions.
pub const METRIC_INTERACTIONS_TOTAL: &str = "dashbrowse_search_interactions_total";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Backend answered with an error status.
    Backend,
    /// Request timeout.
    Timeout,
    /// Request was abandoned before completion.
    Abandoned,
    /// Malformed data on our side (catalog, JSON, IO).
    Data,
    /// Requested rows were not available.
    NotLoaded,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Backend => "backend",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Abandoned => "abandoned",
            ErrorCategory::Data => "data",
            ErrorCategory::NotLoaded => "not_loaded",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::Backend { .. } => ErrorCategory::Backend,
            ClientError::Timeout(_) => ErrorCategory::Timeout,
            ClientError::Abandoned => ErrorCategory::Abandoned,
            ClientError::NotLoaded { .. } => ErrorCategory::NotLoaded,
            ClientError::InvalidCatalog(_) | ClientError::Io(_) | ClientError::Json(_) => {
                ErrorCategory::Data
            }
        }
    }
}

/// Which backend call a dispatch used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    All,
    Starred,
}

impl SearchKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SearchKind::All => "all",
            SearchKind::Starred => "starred",
        }
    }
}

/// Metrics collector for search dispatches.
///
/// A thin wrapper around the `metrics` crate macros with consistent labels.
#[derive(Debug, Clone, Default)]
pub struct SearchMetrics {
    enabled: bool,
}

impl SearchMetrics {
    /// Create an enabled collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a collector that records nothing.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record that a dispatch was issued.
    pub fn record_dispatch(&self, kind: SearchKind) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_SEARCHES_TOTAL, "kind" => kind.as_str()).increment(1);
    }

    /// Record how long a dispatch took and whether it succeeded.
    pub fn record_duration(&self, kind: SearchKind, duration: Duration, ok: bool) {
        if !self.enabled {
            return;
        }
        metrics::histogram!(METRIC_SEARCH_DURATION,
            "kind" => kind.as_str(),
            "outcome" => if ok { "ok" } else { "error" },
        )
        .record(duration.as_secs_f64());
    }

    /// Record a response dropped because a newer dispatch was issued.
    pub fn record_stale(&self) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_STALE_RESPONSES_TOTAL).increment(1);
    }

    /// Record a failed dispatch.
    pub fn record_error(&self, category: ErrorCategory) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_SEARCH_ERRORS_TOTAL, "category" => category.as_str())
            .increment(1);
    }
}
