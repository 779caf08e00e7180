//! Builder for `StateManager`.
//!
//! Collaborators default to in-memory preferences, the metrics-backed
//! interaction reporter and enabled search metrics; the `BrowseConfig`
//! defaults to `BrowseConfig::default()`.

use std::sync::{Arc, Mutex};

use dashbrowse_client::{SearchMetrics, SearchService};
use dashbrowse_config::{BrowseConfig, MemoryPreferenceStore, PreferenceStore};
use tokio::sync::watch;
use uuid::Uuid;

use super::{Inner, SearchStatus, Shared, StateManager};
use crate::debounce::Debouncer;
use crate::keyboard::KeyboardNavigationRouter;
use crate::query::QueryState;
use crate::route::{RouteSync, Router};
use crate::selection::SelectionModel;
use crate::telemetry::{InteractionReporter, MetricsInteractionReporter};

pub struct StateManagerBuilder {
    service: Arc<dyn SearchService>,
    router: Arc<dyn Router>,
    preferences: Option<Arc<dyn PreferenceStore>>,
    reporter: Option<Arc<dyn InteractionReporter>>,
    metrics: Option<SearchMetrics>,
    config: BrowseConfig,
    initial_state: QueryState,
}

impl StateManagerBuilder {
    pub fn new(service: Arc<dyn SearchService>, router: Arc<dyn Router>) -> Self {
        Self {
            service,
            router,
            preferences: None,
            reporter: None,
            metrics: None,
            config: BrowseConfig::default(),
            initial_state: QueryState::default(),
        }
    }

    pub fn config(mut self, config: BrowseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn InteractionReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn metrics(mut self, metrics: SearchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// State used until `init_from_route` runs.
    pub fn initial_state(mut self, state: QueryState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn build(self) -> StateManager {
        let telemetry_enabled = self.config.telemetry_enabled;
        let preferences = self
            .preferences
            .unwrap_or_else(|| Arc::new(MemoryPreferenceStore::new()));
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(MetricsInteractionReporter::new(telemetry_enabled)));
        let metrics = self.metrics.unwrap_or_else(|| {
            if telemetry_enabled {
                SearchMetrics::new()
            } else {
                SearchMetrics::disabled()
            }
        });

        let inner = Inner {
            query: self.initial_state,
            result: None,
            status: SearchStatus::Idle,
            generation: 0,
            last_query: None,
            selection: SelectionModel::new(),
        };
        let (snapshots, _) = watch::channel(inner.snapshot());

        let config = self.config;
        let shared = Shared {
            session_id: Uuid::new_v4(),
            route_debounce: Debouncer::new("route", config.route_debounce),
            search_debounce: Debouncer::new("search", config.search_debounce),
            usage_debounce: Debouncer::new("usage_report", config.usage_report_debounce),
            config,
            inner: Mutex::new(inner),
            service: self.service,
            route: RouteSync::new(self.router, preferences),
            reporter,
            metrics,
            snapshots,
            keyboard: KeyboardNavigationRouter::default(),
        };

        StateManager {
            shared: Arc::new(shared),
        }
    }
}
