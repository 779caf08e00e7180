//! Testing utilities for code built on `StateManager`.
//!
//! Available when running tests or when the `test-utils` feature is enabled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashbrowse_client::SearchService;
use dashbrowse_config::{BrowseConfig, MemoryPreferenceStore};

use crate::manager::StateManager;
use crate::route::MemoryRouter;
use crate::telemetry::{InteractionReporter, Properties};

/// A reported interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub properties: Properties,
}

/// Reporter that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.name.clone()).collect()
    }

    /// Number of events whose name ends with `suffix`.
    pub fn count(&self, suffix: &str) -> usize {
        self.lock().iter().filter(|e| e.name.ends_with(suffix)).count()
    }
}

impl InteractionReporter for RecordingReporter {
    fn report(&self, event: &str, properties: &Properties) {
        self.lock().push(RecordedEvent {
            name: event.to_string(),
            properties: properties.clone(),
        });
    }
}

/// A manager wired to in-memory collaborators the test can inspect.
pub struct Harness {
    pub manager: StateManager,
    pub router: Arc<MemoryRouter>,
    pub preferences: Arc<MemoryPreferenceStore>,
    pub reporter: Arc<RecordingReporter>,
}

impl Harness {
    pub fn new(service: Arc<dyn SearchService>) -> Self {
        Self::with_route(service, "", BrowseConfig::default())
    }

    /// Start from `query_string` with `config`.
    pub fn with_route(service: Arc<dyn SearchService>, query_string: &str, config: BrowseConfig) -> Self {
        Self::with_preferences(service, query_string, config, MemoryPreferenceStore::new())
    }

    pub fn with_preferences(
        service: Arc<dyn SearchService>,
        query_string: &str,
        config: BrowseConfig,
        preferences: MemoryPreferenceStore,
    ) -> Self {
        let router = Arc::new(MemoryRouter::from_query_string(query_string));
        let preferences = Arc::new(preferences);
        let reporter = Arc::new(RecordingReporter::new());
        let manager = StateManager::builder(service, router.clone())
            .config(config)
            .preferences(preferences.clone())
            .reporter(reporter.clone())
            .build();
        Self {
            manager,
            router,
            preferences,
            reporter,
        }
    }
}
