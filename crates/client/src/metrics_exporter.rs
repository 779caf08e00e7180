//! Prometheus recorder for search metrics.
//!
//! Installs a global `PrometheusRecorder` so the counters and histograms in
//! `metrics.rs` are collected, and renders them in Prometheus text format on
//! demand. One-shot tools print the rendering on exit instead of serving it.
//!
//! # Example
//!
//! ```rust,ignore
//! use dashbrowse_client::metrics_exporter::MetricsExporter;
//!
//! let exporter = MetricsExporter::install()?;
//! // ... run searches ...
//! eprintln!("{}", exporter.render());
//! ```

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::metrics::METRIC_SEARCH_DURATION;

/// Histogram buckets for search latency, in seconds.
const SEARCH_DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Handle to the installed recorder.
pub struct MetricsExporter {
    handle: PrometheusHandle,
}

impl MetricsExporter {
    /// Install the Prometheus recorder as the global metrics recorder.
    ///
    /// # Errors
    /// Fails if the histogram buckets are rejected or another recorder is
    /// already installed.
    pub fn install() -> Result<Self, MetricsExporterError> {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(METRIC_SEARCH_DURATION.to_string()),
                SEARCH_DURATION_BUCKETS,
            )?
            .install_recorder()
            .map_err(|_| MetricsExporterError::RecorderAlreadyInstalled)?;

        tracing::debug!("prometheus recorder installed");
        Ok(Self { handle })
    }

    /// Current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Errors that can occur when installing the recorder.
#[derive(Debug, thiserror::Error)]
pub enum MetricsExporterError {
    /// A metrics recorder is already installed.
    #[error("A metrics recorder is already installed")]
    RecorderAlreadyInstalled,

    /// Failed to build the Prometheus recorder.
    #[error("Failed to build Prometheus recorder: {0}")]
    BuildError(String),
}

impl From<metrics_exporter_prometheus::BuildError> for MetricsExporterError {
    fn from(err: metrics_exporter_prometheus::BuildError) -> Self {
        MetricsExporterError::BuildError(err.to_string())
    }
}
