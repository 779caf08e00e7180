//! The search state manager.
//!
//! Responsibilities:
//! - Own one browsing session: query state, last committed result, status,
//!   dispatch generation and selection.
//! - Apply mutations synchronously, then schedule three independently
//!   debounced effects: route write, search dispatch and usage report.
//! - Commit a search response only if no newer dispatch was issued.
//! - Publish snapshots on a watch channel and navigation intents on a
//!   broadcast channel.
//!
//! Does NOT handle:
//! - Rendering or row layout.
//! - Cancelling backend calls; stale responses are discarded on arrival.
//!
//! Invariants:
//! - `generation` only grows; a response commits iff its generation is current.
//! - A failed dispatch keeps the previous result and never panics the caller.
//! - Result commits never touch the selection.

mod builder;
mod mutators;


use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use crossterm::event::KeyEvent;
use dashbrowse_client::{
    ClientError, ErrorCategory, QueryResponse, SearchKind, SearchMetrics, SearchQuery,
    SearchService, SortOption, TermCount,
};
use dashbrowse_config::BrowseConfig;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::cursor::{CursorHandle, CursorMode, CursorTracker, spawn_cursor_tracker};
use crate::debounce::Debouncer;
use crate::derive::derive_search_query;
use crate::keyboard::{KeyboardNavigationRouter, NavigationAction};
use crate::query::{Layout, QueryAction, QueryPatch, QueryState};
use crate::route::{RouteSync, to_query_string, to_route_params};
use crate::selection::{SelectionAction, SelectionModel};
use crate::telemetry::{
    EVENT_SEARCH_QUERY_FAILED, EVENT_SEARCH_QUERY_SUBMITTED, InteractionReporter, Properties,
    event_name,
};

pub use builder::StateManagerBuilder;

/// Lifecycle of the latest dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum SearchStatus {
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// Read-only view of a session.
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    /// Query state with the layout normalized.
    pub query: QueryState,
    pub result: Option<QueryResponse>,
    pub status: SearchStatus,
    pub generation: u64,
    pub selection: SelectionModel,
}

impl SearchSnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    /// Query string the route reflects for this state.
    pub fn route_query_string(&self) -> String {
        to_query_string(&to_route_params(&self.query))
    }
}

struct Inner {
    query: QueryState,
    result: Option<QueryResponse>,
    status: SearchStatus,
    generation: u64,
    last_query: Option<SearchQuery>,
    selection: SelectionModel,
}

impl Inner {
    fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.normalized(),
            result: self.result.clone(),
            status: self.status.clone(),
            generation: self.generation,
            selection: self.selection.clone(),
        }
    }
}

struct Shared {
    session_id: Uuid,
    config: BrowseConfig,
    inner: Mutex<Inner>,
    service: Arc<dyn SearchService>,
    route: RouteSync,
    reporter: Arc<dyn InteractionReporter>,
    metrics: SearchMetrics,
    route_debounce: Debouncer,
    search_debounce: Debouncer,
    usage_debounce: Debouncer,
    snapshots: watch::Sender<SearchSnapshot>,
    keyboard: KeyboardNavigationRouter,
}

/// Handle to one browsing session. Cheap to clone.
///
/// Mutators schedule timers and must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct StateManager {
    shared: Arc<Shared>,
}

impl StateManager {
    pub fn builder(
        service: Arc<dyn SearchService>,
        router: Arc<dyn crate::route::Router>,
    ) -> StateManagerBuilder {
        StateManagerBuilder::new(service, router)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.shared.config
    }

    /// Send the current state to subscribers.
    ///
    /// The lock is held across the send so concurrent publishers cannot
    /// overwrite a newer snapshot with an older one.
    fn publish(&self) {
        let inner = self.lock();
        self.shared.snapshots.send_replace(inner.snapshot());
    }

    /// Current state.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.lock().snapshot()
    }

    /// Raw query state, layout not normalized.
    pub fn query_state(&self) -> QueryState {
        self.lock().query.clone()
    }

    /// Stream of snapshots, updated on every state or status change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// The last dispatched backend query.
    pub fn last_query(&self) -> Option<SearchQuery> {
        self.lock().last_query.clone()
    }

    /// Read the route and stored preferences into the query state.
    ///
    /// With `do_initial_search`, a search is dispatched right away instead of
    /// after the debounce window.
    pub fn init_from_route(&self, do_initial_search: bool) {
        let state = self.shared.route.initial_state();
        self.lock().query = state;
        self.publish();
        tracing::info!(session = %self.shared.session_id, "search session started");

        if do_initial_search {
            let manager = self.clone();
            tokio::spawn(async move { manager.do_search().await });
        }
    }

    /// Apply `action`, then schedule the route write, search and usage report.
    pub fn dispatch(&self, action: QueryAction) {
        self.lock().query.apply(action);
        self.publish();
        self.schedule_effects();
    }

    /// Merge `patch` into the query state and search.
    pub fn set_query_and_search(&self, patch: QueryPatch) {
        self.dispatch(QueryAction::Merge(patch));
    }

    /// Scheduled effects hold a weak handle: once the last `StateManager` is
    /// dropped, the debouncers abort their timers and nothing fires.
    fn schedule_effects(&self) {
        let session = Arc::downgrade(&self.shared);
        self.shared.route_debounce.schedule(async move {
            if let Some(manager) = StateManager::upgrade(&session) {
                manager.push_route();
            }
        });

        let session = Arc::downgrade(&self.shared);
        self.shared.search_debounce.schedule(async move {
            if let Some(manager) = StateManager::upgrade(&session) {
                manager.do_search().await;
            }
        });

        let session = Arc::downgrade(&self.shared);
        self.shared.usage_debounce.schedule(async move {
            if let Some(manager) = StateManager::upgrade(&session) {
                manager.report_usage();
            }
        });
    }

    fn upgrade(session: &Weak<Shared>) -> Option<StateManager> {
        session.upgrade().map(|shared| StateManager { shared })
    }

    fn push_route(&self) {
        let state = self.lock().query.clone();
        self.shared.route.push(&state);
    }

    /// Whether any debounced effect is still waiting.
    pub fn has_pending_effects(&self) -> bool {
        self.shared.route_debounce.is_pending()
            || self.shared.search_debounce.is_pending()
            || self.shared.usage_debounce.is_pending()
    }

    /// Run pending effects now instead of waiting for their timers.
    pub async fn flush(&self) {
        if self.shared.route_debounce.cancel() {
            self.push_route();
        }
        if self.shared.usage_debounce.cancel() {
            self.report_usage();
        }
        if self.shared.search_debounce.cancel() {
            self.do_search().await;
        }
    }

    /// Dispatch one search for the current state.
    ///
    /// The response is committed only if no later dispatch happened meanwhile.
    pub async fn do_search(&self) {
        let (generation, query, starred) = {
            let mut inner = self.lock();
            inner.generation += 1;
            let query = derive_search_query(&inner.query);
            inner.last_query = Some(query.clone());
            inner.status = SearchStatus::Loading;
            (inner.generation, query, inner.query.starred)
        };
        self.publish();

        let kind = if starred {
            SearchKind::Starred
        } else {
            SearchKind::All
        };
        let shared = &self.shared;
        shared.metrics.record_dispatch(kind);
        tracing::debug!(
            session = %shared.session_id,
            generation,
            query = %query.query,
            kind = kind.as_str(),
            "dispatching search"
        );

        let started = Instant::now();
        let pending = if starred {
            shared.service.search_starred(query.clone())
        } else {
            shared.service.search(query.clone())
        };
        let result = pending.await;
        shared
            .metrics
            .record_duration(kind, started.elapsed(), result.is_ok());

        let failure = {
            let mut inner = self.lock();
            if inner.generation != generation {
                drop(inner);
                shared.metrics.record_stale();
                tracing::debug!(
                    session = %shared.session_id,
                    generation,
                    "discarding stale search response"
                );
                return;
            }
            match result {
                Ok(response) => {
                    inner.result = Some(response);
                    inner.status = SearchStatus::Loaded;
                    None
                }
                Err(e) => {
                    inner.status = SearchStatus::Errored(e.to_string());
                    Some(e)
                }
            }
        };
        self.publish();

        if let Some(error) = failure {
            self.on_search_failed(&query, &error);
        }
    }

    fn on_search_failed(&self, query: &SearchQuery, error: &ClientError) {
        self.shared.metrics.record_error(ErrorCategory::from(error));
        tracing::warn!(
            session = %self.shared.session_id,
            error = %error,
            "search failed, keeping previous result"
        );

        let mut properties = match serde_json::to_value(query) {
            Ok(Value::Object(map)) => map,
            _ => Properties::new(),
        };
        properties.insert("error".to_string(), Value::from(error.to_string()));
        properties.insert(
            "session_id".to_string(),
            Value::from(self.shared.session_id.to_string()),
        );
        self.report(EVENT_SEARCH_QUERY_FAILED, &properties);
    }

    /// Properties describing the current query shape.
    fn query_properties(&self) -> Properties {
        let state = self.lock().query.clone();
        let mut properties = Properties::new();
        properties.insert(
            "layout".to_string(),
            Value::from(state.effective_layout().as_str()),
        );
        properties.insert("starred".to_string(), Value::from(state.starred));
        properties.insert(
            "sort".to_string(),
            state.sort.map(Value::from).unwrap_or(Value::Null),
        );
        properties.insert("tag_count".to_string(), Value::from(state.tags.len()));
        properties.insert("query_length".to_string(), Value::from(state.term.len()));
        properties.insert(
            "include_sub_items".to_string(),
            Value::from(state.include_sub_items),
        );
        properties.insert(
            "session_id".to_string(),
            Value::from(self.shared.session_id.to_string()),
        );
        properties
    }

    fn report_usage(&self) {
        let properties = self.query_properties();
        self.report(EVENT_SEARCH_QUERY_SUBMITTED, &properties);
    }

    /// Hand an event to the reporter. A panicking reporter is logged and ignored.
    fn report(&self, suffix: &str, properties: &Properties) {
        let event = event_name(&self.shared.config.event_namespace, suffix);
        let reporter = &self.shared.reporter;
        let outcome = catch_unwind(AssertUnwindSafe(|| reporter.report(&event, properties)));
        if outcome.is_err() {
            tracing::warn!(event = %event, "interaction reporter panicked");
        }
    }

    /// Tag facets for the last dispatched query, or for browsing everything.
    pub async fn tag_options(&self) -> Result<Vec<TermCount>, ClientError> {
        let query = self.last_query().unwrap_or_else(SearchQuery::browse_all);
        self.shared.service.tag_options(query).await
    }

    pub async fn sort_options(&self) -> Result<Vec<SortOption>, ClientError> {
        self.shared.service.sort_options().await
    }

    /// Current selection.
    pub fn selection(&self) -> SelectionModel {
        self.lock().selection.clone()
    }

    pub fn selection_count(&self) -> usize {
        self.lock().selection.count()
    }

    /// Apply a selection transition.
    pub fn update_selection(&self, action: SelectionAction) {
        {
            let mut inner = self.lock();
            let current = std::mem::take(&mut inner.selection);
            inner.selection = current.apply(action);
        }
        self.publish();
    }

    pub fn toggle_selection(&self, kind: &str, id: &str, selected: bool) {
        self.update_selection(SelectionAction::Toggle {
            kind: kind.to_string(),
            id: id.to_string(),
            selected,
        });
    }

    pub fn clear_selection(&self) {
        self.update_selection(SelectionAction::Clear);
    }

    /// Select or deselect every loaded row of the current result.
    pub fn select_loaded_rows(&self, selected: bool) {
        {
            let mut inner = self.lock();
            let Some(view) = inner.result.as_ref().map(|r| r.view.clone()) else {
                return;
            };
            let current = std::mem::take(&mut inner.selection);
            inner.selection = current.select_loaded_rows(&view, selected);
        }
        self.publish();
    }

    /// Select or deselect a folder and its loaded descendants.
    pub fn select_folder_with_children(&self, folder_uid: &str, selected: bool) {
        {
            let mut inner = self.lock();
            let current = std::mem::take(&mut inner.selection);
            inner.selection = match inner.result.as_ref().map(|r| r.view.clone()) {
                Some(view) => current.select_folder_with_children(folder_uid, &view, selected),
                None => current.toggle(dashbrowse_client::KIND_FOLDER, folder_uid, selected),
            };
        }
        self.publish();
    }

    /// Feed a raw key press to the navigation router.
    pub fn on_key_down(&self, event: KeyEvent) -> Option<NavigationAction> {
        self.shared.keyboard.on_key_down(event)
    }

    pub fn keyboard(&self) -> &KeyboardNavigationRouter {
        &self.shared.keyboard
    }

    pub fn navigation_intents(&self) -> broadcast::Receiver<NavigationAction> {
        self.shared.keyboard.subscribe()
    }

    /// Cursor shape matching `layout`, with the configured grid width.
    pub fn cursor_mode_for(&self, layout: Layout) -> CursorMode {
        match layout {
            Layout::Grid => CursorMode::Grid {
                columns: self.shared.config.grid_columns,
            },
            Layout::Folders | Layout::List => CursorMode::List,
        }
    }

    /// Start a cursor tracker bound to this session.
    pub fn spawn_cursor(&self, mode: CursorMode) -> CursorHandle {
        let tracker = CursorTracker::new(mode, self.shared.config.base_path.clone());
        spawn_cursor_tracker(
            tracker,
            self.subscribe(),
            self.navigation_intents(),
            Arc::clone(self.shared.route.router()),
        )
    }
}
