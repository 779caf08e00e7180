//! Interaction reporting.
//!
//! Responsibilities:
//! - Define the fire-and-forget `InteractionReporter` sink.
//! - Provide a reporter backed by the `metrics` crate and a no-op reporter.
//! - Name interaction events (`<namespace>_<suffix>`).
//!
//! Non-goals:
//! - Exporting metrics (the binary installs a recorder if it wants one).
//! - User text in metric labels (only the event name is a label; properties
//!   go to debug logs).

use dashbrowse_client::metrics::METRIC_INTERACTIONS_TOTAL;
use serde_json::{Map, Value};

/// Event properties.
pub type Properties = Map<String, Value>;

pub const EVENT_SEARCH_QUERY_FAILED: &str = "search_query_failed";
pub const EVENT_SEARCH_QUERY_SUBMITTED: &str = "search_query_submitted";
pub const EVENT_SEARCH_RESULT_CLICKED: &str = "search_result_clicked";

/// Full event name for `suffix` under `namespace`.
pub fn event_name(namespace: &str, suffix: &str) -> String {
    format!("{namespace}_{suffix}")
}

/// Sink for user interaction events. Reporting cannot fail.
pub trait InteractionReporter: Send + Sync {
    fn report(&self, event: &str, properties: &Properties);
}

/// Counts interactions through `metrics` and logs their properties.
#[derive(Debug, Clone)]
pub struct MetricsInteractionReporter {
    enabled: bool,
}

impl MetricsInteractionReporter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for MetricsInteractionReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InteractionReporter for MetricsInteractionReporter {
    fn report(&self, event: &str, properties: &Properties) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_INTERACTIONS_TOTAL, "event" => event.to_string()).increment(1);
        tracing::debug!(
            event,
            properties = %serde_json::Value::Object(properties.clone()),
            "interaction reported"
        );
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl InteractionReporter for NoopReporter {
    fn report(&self, _event: &str, _properties: &Properties) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name() {
        assert_eq!(
            event_name("dashbrowse_search", EVENT_SEARCH_QUERY_FAILED),
            "dashbrowse_search_search_query_failed"
        );
    }

    #[test]
    fn test_reporters_without_recorder() {
        let mut props = Properties::new();
        props.insert("layout".to_string(), Value::from("list"));
        MetricsInteractionReporter::default().report("x_search_query_submitted", &props);
        MetricsInteractionReporter::new(false).report("x", &props);
        NoopReporter.report("x", &props);
    }
}
